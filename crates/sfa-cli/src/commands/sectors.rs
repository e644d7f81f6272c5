use serde::Serialize;
use sfa_core::{CapTier, Metric, RatingPipeline, SectorStatistics};

use crate::cli::SectorsArgs;
use crate::error::CliError;

use super::input::{load, parse_tier};
use super::CommandResult;

#[derive(Debug, Serialize)]
struct SectorsResponseData {
    tier: CapTier,
    records: usize,
    sectors: SectorStatistics,
}

pub fn run(args: &SectorsArgs, pipeline: &RatingPipeline) -> Result<CommandResult, CliError> {
    let loaded = load(&args.input)?;
    let tier = parse_tier(&args.tier)?;
    let partitioned = pipeline.partition(&loaded.records, &loaded.exchange);
    let members = partitioned.get(tier);
    let statistics = pipeline.statistics_for(members);

    let mut warnings = loaded.warnings;
    warnings.extend(
        statistics
            .sectors()
            .filter(|sector| {
                statistics
                    .get(sector, Metric::PeRatio)
                    .is_some_and(|stats| stats.peers == 1)
            })
            .map(|sector| format!("sector '{sector}' has a single member; its dispersion unit is zero")),
    );

    let data = serde_json::to_value(SectorsResponseData {
        tier,
        records: members.len(),
        sectors: statistics,
    })?;

    Ok(CommandResult::ok(data, loaded.exchange).with_warnings(warnings))
}
