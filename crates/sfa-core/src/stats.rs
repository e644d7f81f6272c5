//! Sector-relative distribution anchors.
//!
//! For every sector present in a collection and every tracked metric this
//! computes a low anchor (10th percentile), a high anchor (90th percentile) and
//! a dispersion unit (population standard deviation / 5). Percentiles use
//! linear interpolation between closest ranks, `pos = (n - 1) * q`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Metric, StockRecord};

/// Knobs for the anchor computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsOptions {
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub dispersion_divisor: f64,
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        Self {
            low_percentile: 0.10,
            high_percentile: 0.90,
            dispersion_divisor: 5.0,
        }
    }
}

/// Anchors for one (sector, metric) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub low_anchor: f64,
    pub high_anchor: f64,
    pub dispersion_unit: f64,
    /// Number of peer values the anchors were computed from.
    pub peers: usize,
}

impl MetricStats {
    /// Anchors for a set of peer values; `None` when `values` is empty.
    pub fn from_values(values: &[f64], options: StatisticsOptions) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            low_anchor: percentile(&sorted, options.low_percentile)?,
            high_anchor: percentile(&sorted, options.high_percentile)?,
            dispersion_unit: population_std(&sorted)? / options.dispersion_divisor,
            peers: sorted.len(),
        })
    }
}

/// sector -> metric -> anchors, recomputed per rating pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorStatistics {
    sectors: BTreeMap<String, BTreeMap<Metric, MetricStats>>,
}

impl SectorStatistics {
    /// Compute anchors for every sector in `records` over `metrics`.
    ///
    /// Absent metric values are skipped; a (sector, metric) pair with no
    /// values at all gets no entry.
    pub fn build(records: &[StockRecord], metrics: &[Metric], options: StatisticsOptions) -> Self {
        let mut by_sector: BTreeMap<&str, Vec<&StockRecord>> = BTreeMap::new();
        for record in records {
            by_sector.entry(record.sector.as_str()).or_default().push(record);
        }

        let mut sectors = BTreeMap::new();
        for (sector, peers) in by_sector {
            if peers.len() == 1 {
                warn!(
                    sector,
                    code = %peers[0].code,
                    "sector has a single member, dispersion unit is zero"
                );
            }

            let mut per_metric = BTreeMap::new();
            for metric in metrics {
                let values: Vec<f64> = peers
                    .iter()
                    .filter_map(|record| record.metrics.get(*metric))
                    .collect();
                if let Some(stats) = MetricStats::from_values(&values, options) {
                    debug!(
                        sector,
                        metric = %metric,
                        low = stats.low_anchor,
                        high = stats.high_anchor,
                        unit = stats.dispersion_unit,
                        peers = stats.peers,
                        "sector anchors"
                    );
                    per_metric.insert(*metric, stats);
                }
            }
            sectors.insert(sector.to_owned(), per_metric);
        }

        Self { sectors }
    }

    pub fn get(&self, sector: &str, metric: Metric) -> Option<&MetricStats> {
        self.sectors.get(sector)?.get(&metric)
    }

    pub fn contains_sector(&self, sector: &str) -> bool {
        self.sectors.contains_key(sector)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

/// Inclusive percentile with linear interpolation over ascending `sorted`.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = last as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Population (ddof = 0) standard deviation.
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MetricValues, Ticker};

    const EPS: f64 = 1e-9;

    fn record(code: &str, sector: &str, pe: f64) -> StockRecord {
        StockRecord::new(
            Ticker::parse(code).expect("ticker"),
            code,
            sector,
            1.0,
            MetricValues::complete([pe, 1.0, 1.0, 1.0, 1.0, 1.0]),
        )
        .expect("record")
    }

    #[test]
    fn interpolates_deciles_of_one_to_ten() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((percentile(&values, 0.1).expect("p10") - 1.9).abs() < EPS);
        assert!((percentile(&values, 0.9).expect("p90") - 9.1).abs() < EPS);
        assert!((percentile(&values, 0.5).expect("p50") - 5.5).abs() < EPS);
    }

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(population_std(&[]), None);
    }

    #[test]
    fn two_member_sector_anchors() {
        let stats = MetricStats::from_values(&[20.0, 10.0], StatisticsOptions::default())
            .expect("stats");
        assert!((stats.low_anchor - 11.0).abs() < EPS);
        assert!((stats.high_anchor - 19.0).abs() < EPS);
        assert!((stats.dispersion_unit - 1.0).abs() < EPS);
        assert_eq!(stats.peers, 2);
    }

    #[test]
    fn single_member_sector_is_degenerate() {
        let stats =
            MetricStats::from_values(&[7.5], StatisticsOptions::default()).expect("stats");
        assert_eq!(stats.low_anchor, 7.5);
        assert_eq!(stats.high_anchor, 7.5);
        assert_eq!(stats.dispersion_unit, 0.0);
    }

    #[test]
    fn builds_per_sector_independently() {
        let records = vec![
            record("AAA", "Tech", 10.0),
            record("BBB", "Energy", 4.0),
            record("CCC", "Tech", 20.0),
        ];
        let stats = SectorStatistics::build(&records, &Metric::ALL, StatisticsOptions::default());

        assert_eq!(stats.len(), 2);
        let tech = stats.get("Tech", Metric::PeRatio).expect("tech stats");
        assert!((tech.dispersion_unit - 1.0).abs() < EPS);
        let energy = stats.get("Energy", Metric::PeRatio).expect("energy stats");
        assert_eq!(energy.low_anchor, 4.0);
        assert!(stats.get("Utilities", Metric::PeRatio).is_none());
    }

    #[test]
    fn skips_absent_values() {
        let mut sparse = record("DDD", "Tech", 0.0);
        sparse.metrics.set(Metric::PeRatio, None);
        let records = vec![record("AAA", "Tech", 10.0), sparse];
        let stats = SectorStatistics::build(&records, &[Metric::PeRatio], StatisticsOptions::default());

        let tech = stats.get("Tech", Metric::PeRatio).expect("tech stats");
        assert_eq!(tech.peers, 1);
        assert_eq!(tech.low_anchor, 10.0);
    }
}
