//! Market-capitalization tiering.
//!
//! Two threshold regimes exist: one for the primary market set (by default
//! `BSE` and `NSE`, thresholds quoted in crores) and one for every other
//! exchange (thresholds in billions). Small is `cap < lower` and large is
//! `cap >= upper` in both. Under [`MidTierRule::Legacy`] the mid predicate
//! differs per regime:
//!
//! | Regime | Legacy mid predicate | Effect |
//! |--------|----------------------|--------|
//! | primary market | `cap > upper \|\| cap < lower` | overlaps small and large, skips the band |
//! | default market | `cap > lower \|\| cap < upper` | admits every record |
//!
//! [`MidTierRule::Banded`] replaces both with the disjoint `lower <= cap < upper`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RatingConfig;
use crate::{CapTier, Exchange, StockRecord};

/// Lower and upper market-cap cut points for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapThresholds {
    pub lower: f64,
    pub upper: f64,
}

impl CapThresholds {
    pub const PRIMARY_MARKET: Self = Self {
        lower: 5_000.0,
        upper: 20_000.0,
    };

    pub const DEFAULT_MARKET: Self = Self {
        lower: 2.0,
        upper: 10.0,
    };

    /// Whether `market_cap` satisfies the predicate for `tier` under `regime`.
    pub fn admits(
        self,
        tier: CapTier,
        market_cap: f64,
        rule: MidTierRule,
        regime: Regime,
    ) -> bool {
        match tier {
            CapTier::Small => market_cap < self.lower,
            CapTier::Large => market_cap >= self.upper,
            CapTier::Mid => match (rule, regime) {
                (MidTierRule::Legacy, Regime::PrimaryMarket) => {
                    market_cap > self.upper || market_cap < self.lower
                }
                (MidTierRule::Legacy, Regime::DefaultMarket) => {
                    market_cap > self.lower || market_cap < self.upper
                }
                (MidTierRule::Banded, _) => market_cap >= self.lower && market_cap < self.upper,
            },
        }
    }
}

/// How the mid tier predicate is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidTierRule {
    /// Per-regime predicate from the module table; mid overlaps other tiers.
    #[default]
    Legacy,
    /// `lower <= cap < upper`; tiers are disjoint and exhaustive.
    Banded,
}

/// Which threshold regime applied to an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    PrimaryMarket,
    DefaultMarket,
}

/// Records split into the three cap tiers, original relative order kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tiers {
    pub small: Vec<StockRecord>,
    pub mid: Vec<StockRecord>,
    pub large: Vec<StockRecord>,
}

impl Tiers {
    pub fn get(&self, tier: CapTier) -> &[StockRecord] {
        match tier {
            CapTier::Small => &self.small,
            CapTier::Mid => &self.mid,
            CapTier::Large => &self.large,
        }
    }

    pub fn take(&mut self, tier: CapTier) -> Vec<StockRecord> {
        match tier {
            CapTier::Small => std::mem::take(&mut self.small),
            CapTier::Mid => std::mem::take(&mut self.mid),
            CapTier::Large => std::mem::take(&mut self.large),
        }
    }

    pub fn into_parts(self) -> (Vec<StockRecord>, Vec<StockRecord>, Vec<StockRecord>) {
        (self.small, self.mid, self.large)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapPartitioner {
    primary_exchanges: Vec<Exchange>,
    primary: CapThresholds,
    default: CapThresholds,
    mid_rule: MidTierRule,
}

impl Default for CapPartitioner {
    fn default() -> Self {
        Self::from_config(&RatingConfig::default())
    }
}

impl CapPartitioner {
    pub fn from_config(config: &RatingConfig) -> Self {
        Self {
            primary_exchanges: config.primary_exchanges.clone(),
            primary: config.primary_thresholds,
            default: config.default_thresholds,
            mid_rule: config.mid_tier_rule,
        }
    }

    pub fn mid_rule(&self) -> MidTierRule {
        self.mid_rule
    }

    pub fn regime_for(&self, exchange: &Exchange) -> Regime {
        if self.primary_exchanges.contains(exchange) {
            Regime::PrimaryMarket
        } else {
            Regime::DefaultMarket
        }
    }

    pub fn thresholds_for(&self, exchange: &Exchange) -> CapThresholds {
        match self.regime_for(exchange) {
            Regime::PrimaryMarket => self.primary,
            Regime::DefaultMarket => self.default,
        }
    }

    /// Tiers `market_cap` belongs to on `exchange`. May be more than one under
    /// the legacy mid rule.
    pub fn tiers_of(&self, exchange: &Exchange, market_cap: f64) -> Vec<CapTier> {
        let regime = self.regime_for(exchange);
        let thresholds = self.thresholds_for(exchange);
        CapTier::ALL
            .into_iter()
            .filter(|tier| thresholds.admits(*tier, market_cap, self.mid_rule, regime))
            .collect()
    }

    pub fn partition(&self, records: &[StockRecord], exchange: &Exchange) -> Tiers {
        let regime = self.regime_for(exchange);
        let thresholds = self.thresholds_for(exchange);
        let select = |tier: CapTier| -> Vec<StockRecord> {
            records
                .iter()
                .filter(|record| {
                    thresholds.admits(tier, record.market_cap, self.mid_rule, regime)
                })
                .cloned()
                .collect()
        };

        let tiers = Tiers {
            small: select(CapTier::Small),
            mid: select(CapTier::Mid),
            large: select(CapTier::Large),
        };

        debug!(
            exchange = %exchange,
            ?regime,
            lower = thresholds.lower,
            upper = thresholds.upper,
            "applied cap thresholds"
        );
        info!(
            exchange = %exchange,
            total = records.len(),
            small = tiers.small.len(),
            mid = tiers.mid.len(),
            large = tiers.large.len(),
            "partitioned records by market cap"
        );

        tiers
    }
}

/// Split `records` into `(small, mid, large)` with the default configuration.
pub fn partition_by_cap(
    records: &[StockRecord],
    exchange: &Exchange,
) -> (Vec<StockRecord>, Vec<StockRecord>, Vec<StockRecord>) {
    CapPartitioner::default()
        .partition(records, exchange)
        .into_parts()
}
