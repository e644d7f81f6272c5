//! Machine-readable response wrapper shared by every `sfa` output.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pipeline::{FailurePolicy, RatingPipeline};
use crate::{Exchange, Grade, Metric, MidTierRule, RatingError, UtcDateTime, ValidationError};

const MIN_REQUEST_ID_LEN: usize = 8;
const TRACE_ID_LEN: usize = 32;

/// Output schema version, rendered as `vMAJOR.MINOR.PATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSchemaVersion {
            value: value.to_owned(),
        };
        let segment = |part: Option<&str>| -> Result<u32, ValidationError> {
            part.filter(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|part| part.parse().ok())
                .ok_or_else(invalid)
        };

        let mut parts = value.strip_prefix('v').ok_or_else(invalid)?.split('.');
        let version = Self::new(
            segment(parts.next())?,
            segment(parts.next())?,
            segment(parts.next())?,
        );
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(value: SchemaVersion) -> Self {
        value.to_string()
    }
}

/// Grading rules a response was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRules {
    pub mid_tier_rule: MidTierRule,
    pub failure_policy: FailurePolicy,
    pub fallback_grade: Grade,
}

impl AppliedRules {
    pub fn of(pipeline: &RatingPipeline) -> Self {
        Self {
            mid_tier_rule: pipeline.partitioner().mid_rule(),
            failure_policy: pipeline.failure_policy(),
            fallback_grade: pipeline.scheme().fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    pub schema_version: SchemaVersion,
    pub generated_at: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<Exchange>,
    pub rules: AppliedRules,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        schema_version: SchemaVersion,
        rules: AppliedRules,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            trace_id: None,
            schema_version,
            generated_at: UtcDateTime::now(),
            exchange: None,
            rules,
            latency_ms: 0,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn for_exchange(mut self, exchange: Option<Exchange>) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Result<Self, ValidationError> {
        self.trace_id = Some(trace_id.into());
        self.validate()?;
        Ok(self)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < MIN_REQUEST_ID_LEN {
            return Err(ValidationError::InvalidRequestId);
        }
        match self.trace_id.as_deref() {
            Some(trace_id) if !is_trace_id(trace_id) => Err(ValidationError::InvalidTraceId),
            _ => Ok(()),
        }
    }
}

/// A trace id is 32 hex digits and never all zeroes.
fn is_trace_id(value: &str) -> bool {
    value.len() == TRACE_ID_LEN
        && value.bytes().all(|b| b.is_ascii_hexdigit())
        && value.bytes().any(|b| b != b'0')
}

/// One failure carried alongside a (possibly partial) result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
}

impl EnvelopeError {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }
        Ok(())
    }
}

impl From<&RatingError> for EnvelopeError {
    fn from(error: &RatingError) -> Self {
        let (ticker, sector, metric) = match error {
            RatingError::MissingData { code, metric } => (Some(code.clone()), None, Some(*metric)),
            RatingError::UnknownTicker { code } => (Some(code.clone()), None, None),
            RatingError::UnknownSector { sector } => (None, Some(sector.clone()), None),
            RatingError::NoPeerData { sector, metric } => {
                (None, Some(sector.clone()), Some(*metric))
            }
        };
        Self {
            code: error.code().to_owned(),
            message: error.to_string(),
            ticker,
            sector,
            metric,
        }
    }
}

/// Standard response envelope for all `sfa` machine-readable outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn new(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        errors.iter().try_for_each(EnvelopeError::validate)?;
        Ok(Self { meta, data, errors })
    }

    /// No warnings and no errors.
    pub fn is_clean(&self) -> bool {
        self.meta.warnings.is_empty() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: SchemaVersion = SchemaVersion::new(1, 0, 0);

    fn rules() -> AppliedRules {
        AppliedRules::of(&RatingPipeline::default())
    }

    #[test]
    fn schema_version_parses_and_displays() {
        let version: SchemaVersion = "v2.10.3".parse().expect("valid");
        assert_eq!(version, SchemaVersion::new(2, 10, 3));
        assert_eq!(version.to_string(), "v2.10.3");
    }

    #[test]
    fn schema_version_rejects_malformed_input() {
        for raw in ["1.0.0", "v1.0", "v1.0.0.0", "v1.+0.0", "v1..0"] {
            let err = raw.parse::<SchemaVersion>().expect_err(raw);
            assert!(matches!(err, ValidationError::InvalidSchemaVersion { .. }));
        }
    }

    #[test]
    fn default_rules_are_reported() {
        let meta = EnvelopeMeta::new("request-12345", V1, rules()).expect("valid");
        let json = serde_json::to_value(&meta).expect("json");
        assert_eq!(json["schema_version"], "v1.0.0");
        assert_eq!(json["rules"]["mid_tier_rule"], "legacy");
        assert_eq!(json["rules"]["failure_policy"], "abort");
        assert_eq!(json["rules"]["fallback_grade"], "C");
    }

    #[test]
    fn rejects_short_request_id() {
        let err = EnvelopeMeta::new("req", V1, rules()).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidRequestId));
    }

    #[test]
    fn rejects_all_zero_trace_id() {
        let err = EnvelopeMeta::new("request-12345", V1, rules())
            .expect("valid")
            .with_trace_id("0".repeat(32))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidTraceId));
    }

    #[test]
    fn missing_data_names_ticker_and_metric() {
        let error = RatingError::MissingData {
            code: String::from("IBM"),
            metric: Metric::PeRatio,
        };
        let payload = EnvelopeError::from(&error);
        assert_eq!(payload.code, "missing_data");
        assert_eq!(payload.ticker.as_deref(), Some("IBM"));
        assert_eq!(payload.metric, Some(Metric::PeRatio));
        assert_eq!(payload.sector, None);
        payload.validate().expect("valid payload");
    }

    #[test]
    fn envelope_with_warning_is_not_clean() {
        let mut meta = EnvelopeMeta::new("request-12345", V1, rules()).expect("valid");
        meta.push_warning("sector 'Tech' has a single member");
        let envelope = Envelope::new(meta, ());
        assert!(!envelope.is_clean());
    }
}
