//! Per-metric letter grading against sector anchors.
//!
//! Each ladder step `k` sits `k` dispersion units away from the anchor. For a
//! lower-is-better metric the basis is the low anchor and thresholds rise
//! (`basis + k * unit`); otherwise the basis is the high anchor and thresholds
//! fall. The first step the value strictly beats wins; if none does, the
//! configured fallback grade is returned.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::stats::{MetricStats, SectorStatistics};
use crate::{Direction, Grade, Metric, RatingError};

/// One rung of the ladder: a grade and its distance from the anchor in
/// dispersion units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderStep {
    pub grade: Grade,
    pub offset_units: f64,
}

/// Ordered grade ladder, best rung first. Order is part of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeLadder {
    steps: Vec<LadderStep>,
}

impl Default for GradeLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl GradeLadder {
    /// `A+` at offset 0 through `F` at offset 12.
    pub fn standard() -> Self {
        let steps = Grade::ALL
            .into_iter()
            .enumerate()
            .map(|(k, grade)| LadderStep {
                grade,
                offset_units: k as f64,
            })
            .collect();
        Self { steps }
    }

    /// Grade `value` against `stats` in the given direction.
    pub fn grade(
        &self,
        stats: &MetricStats,
        direction: Direction,
        value: f64,
        fallback: Grade,
    ) -> Grade {
        for step in &self.steps {
            let offset = stats.dispersion_unit * step.offset_units;
            let beats = match direction {
                Direction::LowerIsBetter => value < stats.low_anchor + offset,
                Direction::HigherIsBetter => value > stats.high_anchor - offset,
            };
            if beats {
                return step.grade;
            }
        }
        fallback
    }
}

/// Grades metric values for stocks of one tier against shared statistics.
#[derive(Debug, Clone, Copy)]
pub struct MetricGrader<'a> {
    statistics: &'a SectorStatistics,
    ladder: &'a GradeLadder,
    fallback: Grade,
}

impl<'a> MetricGrader<'a> {
    pub fn new(statistics: &'a SectorStatistics, ladder: &'a GradeLadder, fallback: Grade) -> Self {
        Self {
            statistics,
            ladder,
            fallback,
        }
    }

    /// Letter grade of `value` for `metric` relative to `sector` peers.
    pub fn grade(&self, sector: &str, metric: Metric, value: f64) -> Result<Grade, RatingError> {
        let stats = self.statistics.get(sector, metric).ok_or_else(|| {
            if self.statistics.contains_sector(sector) {
                RatingError::NoPeerData {
                    sector: sector.to_owned(),
                    metric,
                }
            } else {
                RatingError::UnknownSector {
                    sector: sector.to_owned(),
                }
            }
        })?;

        let grade = self
            .ladder
            .grade(stats, metric.direction(), value, self.fallback);
        trace!(sector, metric = %metric, value, grade = %grade, "graded metric");
        Ok(grade)
    }
}

/// Grade a single value with the standard ladder and a `C` fallback.
pub fn grade_metric(
    statistics: &SectorStatistics,
    sector: &str,
    metric: Metric,
    value: f64,
) -> Result<Grade, RatingError> {
    let ladder = GradeLadder::standard();
    MetricGrader::new(statistics, &ladder, Grade::C).grade(sector, metric, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(low: f64, high: f64, unit: f64) -> MetricStats {
        MetricStats {
            low_anchor: low,
            high_anchor: high,
            dispersion_unit: unit,
            peers: 10,
        }
    }

    #[test]
    fn lower_is_better_walks_up_from_low_anchor() {
        let ladder = GradeLadder::standard();
        let s = stats(10.0, 50.0, 1.0);
        let grade = |value| ladder.grade(&s, Direction::LowerIsBetter, value, Grade::C);

        assert_eq!(grade(9.99), Grade::APlus);
        assert_eq!(grade(10.0), Grade::A);
        assert_eq!(grade(10.5), Grade::A);
        assert_eq!(grade(12.5), Grade::BPlus);
        assert_eq!(grade(21.9), Grade::F);
        assert_eq!(grade(22.0), Grade::C);
    }

    #[test]
    fn higher_is_better_walks_down_from_high_anchor() {
        let ladder = GradeLadder::standard();
        let s = stats(0.0, 5.0, 0.5);
        let grade = |value| ladder.grade(&s, Direction::HigherIsBetter, value, Grade::C);

        assert_eq!(grade(5.01), Grade::APlus);
        assert_eq!(grade(5.0), Grade::A);
        assert_eq!(grade(3.9), Grade::BPlus);
        assert_eq!(grade(-0.99), Grade::F);
        assert_eq!(grade(-1.0), Grade::C);
    }

    #[test]
    fn zero_dispersion_boundary_is_exclusive() {
        let ladder = GradeLadder::standard();
        let s = stats(7.0, 7.0, 0.0);

        assert_eq!(ladder.grade(&s, Direction::LowerIsBetter, 7.0, Grade::C), Grade::C);
        assert_eq!(ladder.grade(&s, Direction::LowerIsBetter, 6.9, Grade::C), Grade::APlus);
        assert_eq!(ladder.grade(&s, Direction::HigherIsBetter, 7.0, Grade::C), Grade::C);
        assert_eq!(ladder.grade(&s, Direction::HigherIsBetter, 7.1, Grade::C), Grade::APlus);
    }

    #[test]
    fn fallback_grade_is_configurable() {
        let ladder = GradeLadder::standard();
        let s = stats(1.0, 1.0, 0.1);
        assert_eq!(
            ladder.grade(&s, Direction::LowerIsBetter, 100.0, Grade::F),
            Grade::F
        );
    }

    #[test]
    fn default_fallback_ranks_values_past_f_above_f() {
        let ladder = GradeLadder::standard();
        let s = stats(10.0, 50.0, 1.0);

        // 21.9 is the better value yet grades F; 22.0 misses every step and gets C
        let nearer = ladder.grade(&s, Direction::LowerIsBetter, 21.9, Grade::C);
        let farther = ladder.grade(&s, Direction::LowerIsBetter, 22.0, Grade::C);
        assert_eq!((nearer, farther), (Grade::F, Grade::C));
        assert!(farther < nearer);

        let nearer = ladder.grade(&s, Direction::HigherIsBetter, 38.1, Grade::C);
        let farther = ladder.grade(&s, Direction::HigherIsBetter, 38.0, Grade::C);
        assert_eq!((nearer, farther), (Grade::F, Grade::C));
    }

    #[test]
    fn lower_is_better_is_monotone_with_f_fallback() {
        let ladder = GradeLadder::standard();
        let s = stats(3.0, 9.0, 0.4);
        let mut previous = Grade::F;
        let mut value = 12.0;
        while value > 0.0 {
            let grade = ladder.grade(&s, Direction::LowerIsBetter, value, Grade::F);
            assert!(grade <= previous, "{value} graded {grade} after {previous}");
            previous = grade;
            value -= 0.05;
        }
    }
}
