use std::time::Instant;

use sfa_core::{AppliedRules, EnvelopeMeta, Exchange, SchemaVersion, ValidationError};
use uuid::Uuid;

pub const SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Identity and timing of one `sfa` invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    request_id: Uuid,
    trace_id: Uuid,
    started: Instant,
}

impl RunContext {
    pub fn begin() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            trace_id: Uuid::new_v4(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Envelope metadata stamped with this run's ids and elapsed time.
    pub fn finish(
        self,
        rules: AppliedRules,
        exchange: Option<Exchange>,
        warnings: Vec<String>,
    ) -> Result<EnvelopeMeta, ValidationError> {
        let request_id = self.request_id.hyphenated().to_string();
        let mut meta = EnvelopeMeta::new(request_id, SCHEMA_VERSION, rules)?
            .with_trace_id(self.trace_id.simple().to_string())?
            .for_exchange(exchange)
            .with_latency_ms(self.elapsed_ms());
        for warning in warnings {
            meta.push_warning(warning);
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use sfa_core::RatingPipeline;

    use super::*;

    #[test]
    fn request_id_is_uuid_v4() {
        let context = RunContext::begin();
        assert_eq!(context.request_id.get_version_num(), 4);
    }

    #[test]
    fn finish_builds_valid_meta() {
        let exchange = Exchange::parse("nyse").expect("exchange");
        let meta = RunContext::begin()
            .finish(
                AppliedRules::of(&RatingPipeline::default()),
                Some(exchange),
                vec![String::from("w1")],
            )
            .expect("valid meta");

        assert_eq!(meta.schema_version.to_string(), "v1.0.0");
        assert_eq!(meta.trace_id.as_deref().map(str::len), Some(32));
        assert_eq!(meta.warnings, vec![String::from("w1")]);
        assert_eq!(meta.exchange.map(String::from).as_deref(), Some("NYSE"));
    }
}
