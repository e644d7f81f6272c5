use sfa_core::{ingest, CapTier, Exchange, StockRecord};
use tracing::debug;

use crate::cli::InputArgs;
use crate::error::CliError;

pub struct LoadedInput {
    pub records: Vec<StockRecord>,
    pub exchange: Exchange,
    pub warnings: Vec<String>,
}

pub fn load(args: &InputArgs) -> Result<LoadedInput, CliError> {
    let exchange = Exchange::parse(&args.exchange)?;

    let (records, warnings) = if args.raw {
        let (records, report) = ingest::clean_raw_path(&args.input)?;
        let warnings = report
            .dropped
            .iter()
            .map(|row| format!("line {} dropped during cleaning: {}", row.line, row.reason))
            .collect();
        (records, warnings)
    } else {
        (ingest::read_cleaned_path(&args.input)?, Vec::new())
    };

    debug!(
        input = %args.input.display(),
        records = records.len(),
        exchange = %exchange,
        "loaded input"
    );

    Ok(LoadedInput {
        records,
        exchange,
        warnings,
    })
}

pub fn parse_tier(raw: &str) -> Result<CapTier, CliError> {
    Ok(raw.parse::<CapTier>()?)
}
