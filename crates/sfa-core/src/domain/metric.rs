use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Which side of the peer distribution counts as "better" for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// The fundamental metrics tracked for every stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "PERatio")]
    PeRatio,
    #[serde(rename = "Earnings/Share")]
    EarningsPerShare,
    #[serde(rename = "DividendYieldRatio")]
    DividendYield,
    #[serde(rename = "BookValue/Share")]
    BookValuePerShare,
    #[serde(rename = "Revenue/Share")]
    RevenuePerShare,
    #[serde(rename = "D/ERatio")]
    DebtToEquity,
}

impl Metric {
    /// Tracked metrics in grading order.
    pub const ALL: [Self; 6] = [
        Self::PeRatio,
        Self::EarningsPerShare,
        Self::DividendYield,
        Self::BookValuePerShare,
        Self::RevenuePerShare,
        Self::DebtToEquity,
    ];

    /// Column label used by the fundamentals dataset.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PeRatio => "PERatio",
            Self::EarningsPerShare => "Earnings/Share",
            Self::DividendYield => "DividendYieldRatio",
            Self::BookValuePerShare => "BookValue/Share",
            Self::RevenuePerShare => "Revenue/Share",
            Self::DebtToEquity => "D/ERatio",
        }
    }

    pub const fn alias(self) -> &'static str {
        match self {
            Self::PeRatio => "pe_ratio",
            Self::EarningsPerShare => "earnings_per_share",
            Self::DividendYield => "dividend_yield",
            Self::BookValuePerShare => "book_value_per_share",
            Self::RevenuePerShare => "revenue_per_share",
            Self::DebtToEquity => "debt_to_equity",
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Self::PeRatio | Self::DebtToEquity => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|metric| {
                metric.label().eq_ignore_ascii_case(trimmed)
                    || metric.alias().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ValidationError::InvalidMetric {
                value: trimmed.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valuation_and_leverage_are_lower_is_better() {
        let lower: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|metric| metric.direction() == Direction::LowerIsBetter)
            .collect();
        assert_eq!(lower, vec![Metric::PeRatio, Metric::DebtToEquity]);
    }

    #[test]
    fn parses_labels_and_aliases() {
        assert_eq!("D/ERatio".parse::<Metric>().expect("label"), Metric::DebtToEquity);
        assert_eq!(
            "book_value_per_share".parse::<Metric>().expect("alias"),
            Metric::BookValuePerShare
        );
        assert!(matches!(
            "ROE".parse::<Metric>(),
            Err(ValidationError::InvalidMetric { .. })
        ));
    }

    #[test]
    fn index_follows_grading_order() {
        for (position, metric) in Metric::ALL.into_iter().enumerate() {
            assert_eq!(metric.index(), position);
        }
    }
}
