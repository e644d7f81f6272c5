use sfa_core::{RatingPipeline, Ticker};

use crate::cli::GradeArgs;
use crate::error::CliError;

use super::input::{load, parse_tier};
use super::CommandResult;

pub fn run(args: &GradeArgs, pipeline: &RatingPipeline) -> Result<CommandResult, CliError> {
    let loaded = load(&args.input)?;
    let tier = parse_tier(&args.tier)?;
    let code = Ticker::parse(&args.code)?;

    let partitioned = pipeline.partition(&loaded.records, &loaded.exchange);
    let breakdown = pipeline.explain(partitioned.get(tier), &code)?;
    let data = serde_json::to_value(breakdown)?;

    Ok(CommandResult::ok(data, loaded.exchange).with_warnings(loaded.warnings))
}
