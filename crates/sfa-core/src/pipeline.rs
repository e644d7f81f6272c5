//! Tier rating pipeline.
//!
//! Sector statistics are built once per tier and shared by reference across
//! every stock in it; ratings are identical to recomputing them per stock.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RatingConfig;
use crate::partition::{CapPartitioner, Tiers};
use crate::rating::{rate_record, GradingScheme, RatingBreakdown};
use crate::stats::{SectorStatistics, StatisticsOptions};
use crate::{CapTier, Exchange, RatingError, StockRecord, Ticker};

/// What happens when one record in a tier cannot be rated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failure aborts the whole tier.
    #[default]
    Abort,
    /// Failing records keep `overall_rating = None` and are reported.
    Isolate,
}

/// A record that could not be rated under [`FailurePolicy::Isolate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingFailure {
    pub code: Ticker,
    pub error: RatingError,
}

/// Output of one tier pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedTier {
    pub records: Vec<StockRecord>,
    pub statistics: SectorStatistics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RatingFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingPipeline {
    scheme: GradingScheme,
    statistics: StatisticsOptions,
    failure_policy: FailurePolicy,
    partitioner: CapPartitioner,
}

impl Default for RatingPipeline {
    fn default() -> Self {
        Self::from_config(&RatingConfig::default())
    }
}

impl RatingPipeline {
    pub fn from_config(config: &RatingConfig) -> Self {
        Self {
            scheme: GradingScheme::from_config(config),
            statistics: config.statistics_options(),
            failure_policy: config.failure_policy,
            partitioner: CapPartitioner::from_config(config),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn scheme(&self) -> &GradingScheme {
        &self.scheme
    }

    pub fn partitioner(&self) -> &CapPartitioner {
        &self.partitioner
    }

    pub fn statistics_for(&self, records: &[StockRecord]) -> SectorStatistics {
        SectorStatistics::build(records, &self.scheme.metrics, self.statistics)
    }

    /// Rate every record of one tier, in order, attaching `overall_rating`.
    pub fn rate_tier(&self, mut records: Vec<StockRecord>) -> Result<RatedTier, RatingError> {
        let statistics = self.statistics_for(&records);
        let mut failures = Vec::new();

        for record in &mut records {
            match rate_record(&statistics, record, &self.scheme) {
                Ok(breakdown) => record.overall_rating = Some(breakdown.overall_rating),
                Err(error) => match self.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Isolate => {
                        warn!(code = %record.code, %error, "isolated rating failure");
                        record.overall_rating = None;
                        failures.push(RatingFailure {
                            code: record.code.clone(),
                            error,
                        });
                    }
                },
            }
        }

        info!(
            records = records.len(),
            sectors = statistics.len(),
            failures = failures.len(),
            "rated tier"
        );

        Ok(RatedTier {
            records,
            statistics,
            failures,
        })
    }

    /// Detailed grades of `code` within `records`.
    pub fn explain(
        &self,
        records: &[StockRecord],
        code: &Ticker,
    ) -> Result<RatingBreakdown, RatingError> {
        let record = records
            .iter()
            .find(|record| &record.code == code)
            .ok_or_else(|| RatingError::UnknownTicker {
                code: code.to_string(),
            })?;
        rate_record(&self.statistics_for(records), record, &self.scheme)
    }

    pub fn partition(&self, records: &[StockRecord], exchange: &Exchange) -> Tiers {
        self.partitioner.partition(records, exchange)
    }

    /// Partition `records` and rate the requested tiers.
    pub fn rate_exchange(
        &self,
        records: &[StockRecord],
        exchange: &Exchange,
        tiers: &[CapTier],
    ) -> Result<Vec<(CapTier, RatedTier)>, RatingError> {
        let mut partitioned = self.partition(records, exchange);
        tiers
            .iter()
            .map(|tier| {
                let rated = self.rate_tier(partitioned.take(*tier))?;
                Ok::<_, RatingError>((*tier, rated))
            })
            .collect()
    }
}

/// Rate one tier with the default configuration.
pub fn rate_tier(records: Vec<StockRecord>) -> Result<Vec<StockRecord>, RatingError> {
    RatingPipeline::default()
        .rate_tier(records)
        .map(|rated| rated.records)
}
