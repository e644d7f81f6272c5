//! Overall rating: grade every tracked metric, map grades to points, sum and
//! rescale.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RatingConfig;
use crate::grading::{GradeLadder, MetricGrader};
use crate::stats::{SectorStatistics, StatisticsOptions};
use crate::{Grade, Metric, RatingError, StockRecord, Ticker};

/// Grade-point lookup, indexed by [`Grade::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable([f64; 13]);

impl ScoreTable {
    pub const STANDARD: Self = Self([
        4.3, 4.0, 3.7, 3.3, 3.0, 2.7, 2.3, 2.0, 1.7, 1.3, 1.0, 0.7, 0.0,
    ]);

    pub fn score(&self, grade: Grade) -> f64 {
        self.0[grade.rank()]
    }

    pub fn best(&self) -> f64 {
        self.0.iter().copied().fold(f64::MIN, f64::max)
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Immutable grading constants handed to the grader and aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingScheme {
    pub metrics: Vec<Metric>,
    pub ladder: GradeLadder,
    pub scores: ScoreTable,
    pub fallback: Grade,
    pub scale: f64,
    pub precision: u32,
}

impl Default for GradingScheme {
    fn default() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
            ladder: GradeLadder::standard(),
            scores: ScoreTable::STANDARD,
            fallback: Grade::C,
            scale: 3.5,
            precision: 2,
        }
    }
}

impl GradingScheme {
    pub fn from_config(config: &RatingConfig) -> Self {
        Self {
            fallback: config.fallback_grade,
            scale: config.rating_scale,
            precision: config.rating_precision,
            ..Self::default()
        }
    }

    /// Highest rating this scheme can produce.
    pub fn max_rating(&self) -> f64 {
        round_to(
            self.scores.best() * self.metrics.len() as f64 * self.scale,
            self.precision,
        )
    }

    pub fn rescale(&self, total_score: f64) -> f64 {
        round_to(total_score * self.scale, self.precision)
    }
}

/// One metric's contribution to a rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricGrade {
    pub metric: Metric,
    pub value: f64,
    pub grade: Grade,
    pub score: f64,
}

/// Full rating detail for one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    pub code: Ticker,
    pub sector: String,
    pub grades: Vec<MetricGrade>,
    pub total_score: f64,
    pub overall_rating: f64,
}

/// Rate `record` against its own sector in precomputed `statistics`.
pub fn rate_record(
    statistics: &SectorStatistics,
    record: &StockRecord,
    scheme: &GradingScheme,
) -> Result<RatingBreakdown, RatingError> {
    rate_in_sector(statistics, record, &record.sector, scheme)
}

/// Rate `record` against the peers of `sector`.
pub fn rate_in_sector(
    statistics: &SectorStatistics,
    record: &StockRecord,
    sector: &str,
    scheme: &GradingScheme,
) -> Result<RatingBreakdown, RatingError> {
    let grader = MetricGrader::new(statistics, &scheme.ladder, scheme.fallback);

    let mut grades = Vec::with_capacity(scheme.metrics.len());
    for metric in &scheme.metrics {
        let value = record.metric(*metric)?;
        let grade = grader.grade(sector, *metric, value)?;
        grades.push(MetricGrade {
            metric: *metric,
            value,
            grade,
            score: scheme.scores.score(grade),
        });
    }

    let total_score: f64 = grades.iter().map(|entry| entry.score).sum();
    let overall_rating = scheme.rescale(total_score);
    debug!(code = %record.code, sector, total_score, overall_rating, "rated stock");

    Ok(RatingBreakdown {
        code: record.code.clone(),
        sector: sector.to_owned(),
        grades,
        total_score,
        overall_rating,
    })
}

/// Overall rating of `code` graded against `sector`, with statistics computed
/// from the whole `dataset`.
///
/// The first record carrying `code` is used. This recomputes statistics on
/// every call; prefer [`crate::pipeline::RatingPipeline`] for whole tiers.
pub fn overall_rating(
    dataset: &[StockRecord],
    code: &Ticker,
    sector: &str,
    scheme: &GradingScheme,
    options: StatisticsOptions,
) -> Result<f64, RatingError> {
    let record = dataset
        .iter()
        .find(|record| &record.code == code)
        .ok_or_else(|| RatingError::UnknownTicker {
            code: code.to_string(),
        })?;
    let statistics = SectorStatistics::build(dataset, &scheme.metrics, options);

    rate_in_sector(&statistics, record, sector, scheme).map(|breakdown| breakdown.overall_rating)
}

/// Round half away from zero to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricValues;

    fn record(code: &str, sector: &str, values: [f64; 6]) -> StockRecord {
        StockRecord::new(
            Ticker::parse(code).expect("ticker"),
            code,
            sector,
            1.0,
            MetricValues::complete(values),
        )
        .expect("record")
    }

    #[test]
    fn standard_scores_match_ladder() {
        let table = ScoreTable::STANDARD;
        assert_eq!(table.score(Grade::APlus), 4.3);
        assert_eq!(table.score(Grade::C), 2.0);
        assert_eq!(table.score(Grade::DMinus), 0.7);
        assert_eq!(table.score(Grade::F), 0.0);
    }

    #[test]
    fn max_rating_for_six_metrics() {
        assert_eq!(GradingScheme::default().max_rating(), 90.3);
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_to(12.0 * 3.5, 2), 42.0);
        assert_eq!(round_to(0.1 + 0.2, 2), 0.3);
        assert_eq!(round_to(2.345_000_1, 2), 2.35);
    }

    #[test]
    fn single_member_sector_falls_back_everywhere() {
        let dataset = vec![record("SOLO", "Utilities", [15.0, 2.0, 0.03, 20.0, 11.0, 0.9])];
        let code = Ticker::parse("SOLO").expect("ticker");
        let rating = overall_rating(
            &dataset,
            &code,
            "Utilities",
            &GradingScheme::default(),
            StatisticsOptions::default(),
        )
        .expect("rating");

        // every metric equals its anchor with zero dispersion: six fallback Cs
        assert_eq!(rating, 42.0);
    }

    #[test]
    fn unknown_ticker_is_reported() {
        let dataset = vec![record("AAA", "Tech", [1.0; 6])];
        let code = Ticker::parse("ZZZ").expect("ticker");
        let err = overall_rating(
            &dataset,
            &code,
            "Tech",
            &GradingScheme::default(),
            StatisticsOptions::default(),
        )
        .expect_err("must fail");
        assert_eq!(
            err,
            RatingError::UnknownTicker {
                code: String::from("ZZZ")
            }
        );
    }

    #[test]
    fn missing_metric_aborts_rating() {
        let mut sparse = record("BBB", "Tech", [1.0; 6]);
        sparse.metrics.set(Metric::RevenuePerShare, None);
        let dataset = vec![record("AAA", "Tech", [2.0; 6]), sparse.clone()];
        let statistics =
            SectorStatistics::build(&dataset, &Metric::ALL, StatisticsOptions::default());

        let err = rate_record(&statistics, &sparse, &GradingScheme::default())
            .expect_err("must fail");
        assert!(matches!(
            err,
            RatingError::MissingData {
                metric: Metric::RevenuePerShare,
                ..
            }
        ));
    }

    #[test]
    fn breakdown_lists_metrics_in_order() {
        let dataset = vec![
            record("AAA", "Tech", [10.0, 5.0, 0.02, 30.0, 40.0, 0.5]),
            record("BBB", "Tech", [20.0, 1.0, 0.01, 10.0, 20.0, 1.5]),
        ];
        let statistics =
            SectorStatistics::build(&dataset, &Metric::ALL, StatisticsOptions::default());
        let breakdown = rate_record(&statistics, &dataset[0], &GradingScheme::default())
            .expect("rating");

        let metrics: Vec<Metric> = breakdown.grades.iter().map(|g| g.metric).collect();
        assert_eq!(metrics, Metric::ALL.to_vec());
        // AAA beats every anchor in the favourable direction
        assert!(breakdown.grades.iter().all(|g| g.grade == Grade::APlus));
        assert_eq!(breakdown.overall_rating, 90.3);
    }
}
