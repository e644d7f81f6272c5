use serde::Serialize;
use sfa_core::{
    CapTier, EnvelopeError, MidTierRule, RatingFailure, RatingPipeline, Regime, StockRecord,
};

use crate::cli::RateArgs;
use crate::error::CliError;

use super::input::{load, parse_tier};
use super::CommandResult;

#[derive(Debug, Serialize)]
struct RatedTierData {
    tier: CapTier,
    count: usize,
    records: Vec<StockRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<RatingFailure>,
}

#[derive(Debug, Serialize)]
struct RateResponseData {
    regime: Regime,
    mid_tier_rule: MidTierRule,
    tiers: Vec<RatedTierData>,
}

pub fn run(args: &RateArgs, pipeline: &RatingPipeline) -> Result<CommandResult, CliError> {
    let loaded = load(&args.input)?;
    let tiers = match &args.tier {
        Some(raw) => vec![parse_tier(raw)?],
        None => CapTier::ALL.to_vec(),
    };

    let rated = pipeline.rate_exchange(&loaded.records, &loaded.exchange, &tiers)?;

    let mut errors = Vec::new();
    let mut tier_data = Vec::with_capacity(rated.len());
    for (tier, rated_tier) in rated {
        errors.extend(
            rated_tier
                .failures
                .iter()
                .map(|failure| EnvelopeError::from(&failure.error)),
        );
        tier_data.push(RatedTierData {
            tier,
            count: rated_tier.records.len(),
            records: rated_tier.records,
            failures: rated_tier.failures,
        });
    }

    let single_tier = match tier_data.as_slice() {
        [only] => Some(only.records.clone()),
        _ => None,
    };

    let data = serde_json::to_value(RateResponseData {
        regime: pipeline.partitioner().regime_for(&loaded.exchange),
        mid_tier_rule: pipeline.partitioner().mid_rule(),
        tiers: tier_data,
    })?;

    let mut result = CommandResult::ok(data, loaded.exchange)
        .with_warnings(loaded.warnings)
        .with_errors(errors);
    if let Some(records) = single_tier {
        result = result.with_records(records);
    }
    Ok(result)
}
