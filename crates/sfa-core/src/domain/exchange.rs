use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Normalized listing exchange code (e.g. `NYSE`, `NSE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Exchange(String);

impl Exchange {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyExchange);
        }
        Ok(Self(normalized))
    }

    /// Already-normalized code baked into the crate.
    pub(crate) fn known(code: &'static str) -> Self {
        Self(code.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Exchange {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Exchange> for String {
    fn from(value: Exchange) -> Self {
        value.0
    }
}

/// Market-capitalization bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapTier {
    Small,
    Mid,
    Large,
}

impl CapTier {
    pub const ALL: [Self; 3] = [Self::Small, Self::Mid, Self::Large];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Mid => "mid",
            Self::Large => "large",
        }
    }
}

impl Display for CapTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapTier {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" | "sml" => Ok(Self::Small),
            "mid" => Ok(Self::Mid),
            "large" | "lrg" => Ok(Self::Large),
            other => Err(ValidationError::InvalidTier {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_exchange_code() {
        let exchange = Exchange::parse(" nse ").expect("valid");
        assert_eq!(exchange.as_str(), "NSE");
        assert!(matches!(
            Exchange::parse("  "),
            Err(ValidationError::EmptyExchange)
        ));
    }

    #[test]
    fn parses_tiers() {
        assert_eq!("Large".parse::<CapTier>().expect("tier"), CapTier::Large);
        assert!(matches!(
            "micro".parse::<CapTier>(),
            Err(ValidationError::InvalidTier { .. })
        ));
    }
}
