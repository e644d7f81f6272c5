use serde::Serialize;
use sfa_core::{CapThresholds, CapTier, MidTierRule, RatingPipeline, Regime, Ticker};

use crate::cli::TiersArgs;
use crate::error::CliError;

use super::input::load;
use super::CommandResult;

#[derive(Debug, Serialize)]
struct TierMembership {
    tier: CapTier,
    count: usize,
    codes: Vec<Ticker>,
}

#[derive(Debug, Serialize)]
struct TiersResponseData {
    regime: Regime,
    thresholds: CapThresholds,
    mid_tier_rule: MidTierRule,
    tiers: Vec<TierMembership>,
    multi_tier_records: usize,
}

pub fn run(args: &TiersArgs, pipeline: &RatingPipeline) -> Result<CommandResult, CliError> {
    let loaded = load(&args.input)?;
    let partitioner = pipeline.partitioner();
    let partitioned = partitioner.partition(&loaded.records, &loaded.exchange);

    let tiers = CapTier::ALL
        .into_iter()
        .map(|tier| {
            let members = partitioned.get(tier);
            TierMembership {
                tier,
                count: members.len(),
                codes: members.iter().map(|record| record.code.clone()).collect(),
            }
        })
        .collect();

    let multi_tier_records = loaded
        .records
        .iter()
        .filter(|record| partitioner.tiers_of(&loaded.exchange, record.market_cap).len() > 1)
        .count();

    let mut warnings = loaded.warnings;
    if multi_tier_records > 0 {
        warnings.push(format!(
            "{multi_tier_records} record(s) belong to more than one tier under the {:?} mid-tier rule",
            partitioner.mid_rule()
        ));
    }

    let data = serde_json::to_value(TiersResponseData {
        regime: partitioner.regime_for(&loaded.exchange),
        thresholds: partitioner.thresholds_for(&loaded.exchange),
        mid_tier_rule: partitioner.mid_rule(),
        tiers,
        multi_tier_records,
    })?;

    Ok(CommandResult::ok(data, loaded.exchange).with_warnings(warnings))
}
