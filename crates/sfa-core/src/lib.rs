//! # SFA Core
//!
//! Sector-relative fundamental grading for equities.
//!
//! ## Overview
//!
//! Stocks are split into market-cap tiers, and within a tier each stock is
//! graded per metric against the peers in its sector:
//!
//! ```text
//! raw records ──▶ CapPartitioner ──▶ tier ──▶ SectorStatistics
//!                                               │
//!                                               ▼
//!                         StockRecord ◀── overall rating ◀── MetricGrader
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Rating configuration and resolution |
//! | [`domain`] | Records, metrics, grades, tickers, tiers |
//! | [`envelope`] | Response envelope, schema version and applied rules |
//! | [`error`] | Core error types |
//! | [`grading`] | Letter grade ladder and per-metric grader |
//! | [`ingest`] | CSV loading and cleaning |
//! | [`partition`] | Market-cap tiering |
//! | [`pipeline`] | Whole-tier rating |
//! | [`rating`] | Overall rating aggregation |
//! | [`stats`] | Sector percentile anchors |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sfa_core::{ingest, Exchange, RatingPipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (records, _report) = ingest::clean_raw_path("sfa_data.csv".as_ref())?;
//!     let pipeline = RatingPipeline::default();
//!     let tiers = pipeline.partition(&records, &Exchange::parse("NYSE")?);
//!
//!     let rated = pipeline.rate_tier(tiers.large)?;
//!     for record in &rated.records {
//!         println!("{} {:?}", record.code, record.overall_rating);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Rating failures are never papered over with defaults:
//!
//! ```rust
//! use sfa_core::RatingError;
//!
//! fn describe(error: &RatingError) -> &'static str {
//!     match error {
//!         RatingError::MissingData { .. } => "clean the input first",
//!         RatingError::UnknownTicker { .. } => "caller passed a foreign ticker",
//!         RatingError::UnknownSector { .. } | RatingError::NoPeerData { .. } => {
//!             "sector has no peers in this tier"
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod grading;
pub mod ingest;
pub mod partition;
pub mod pipeline;
pub mod rating;
pub mod stats;

pub use config::RatingConfig;

pub use domain::{
    CapTier, Direction, Exchange, Grade, Metric, MetricValues, StockRecord, Ticker, UtcDateTime,
};

pub use envelope::{AppliedRules, Envelope, EnvelopeError, EnvelopeMeta, SchemaVersion};

pub use error::{CoreError, IngestError, RatingError, ValidationError};

pub use grading::{grade_metric, GradeLadder, LadderStep, MetricGrader};

pub use ingest::CleaningReport;

pub use partition::{partition_by_cap, CapPartitioner, CapThresholds, MidTierRule, Regime, Tiers};

pub use pipeline::{rate_tier, FailurePolicy, RatedTier, RatingFailure, RatingPipeline};

pub use rating::{overall_rating, GradingScheme, MetricGrade, RatingBreakdown, ScoreTable};

pub use stats::{MetricStats, SectorStatistics, StatisticsOptions};
