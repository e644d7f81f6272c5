mod grade;
mod input;
mod rate;
mod sectors;
mod tiers;

use serde_json::Value;
use sfa_core::{
    AppliedRules, Envelope, EnvelopeError, Exchange, FailurePolicy, RatingConfig, RatingPipeline,
    StockRecord,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::RunContext;

pub struct CommandResult {
    pub data: Value,
    /// Flat rated records, when the command produced exactly one tier.
    pub records: Option<Vec<StockRecord>>,
    pub exchange: Option<Exchange>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value, exchange: Exchange) -> Self {
        Self {
            data,
            records: None,
            exchange: Some(exchange),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_records(mut self, records: Vec<StockRecord>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

/// Envelope plus the flat record set for CSV rendering.
pub struct Rendered {
    pub envelope: Envelope<Value>,
    pub records: Option<Vec<StockRecord>>,
}

pub fn run(cli: &Cli) -> Result<Rendered, CliError> {
    let context = RunContext::begin();
    let config = RatingConfig::resolve(cli.config.as_deref())?;
    let mut pipeline = RatingPipeline::from_config(&config);
    if matches!(&cli.command, Command::Rate(args) if args.isolate_failures) {
        pipeline = pipeline.with_failure_policy(FailurePolicy::Isolate);
    }

    let command_result = match &cli.command {
        Command::Rate(args) => rate::run(args, &pipeline)?,
        Command::Tiers(args) => tiers::run(args, &pipeline)?,
        Command::Sectors(args) => sectors::run(args, &pipeline)?,
        Command::Grade(args) => grade::run(args, &pipeline)?,
    };

    let CommandResult {
        data,
        records,
        exchange,
        warnings,
        errors,
    } = command_result;

    let meta = context.finish(AppliedRules::of(&pipeline), exchange, warnings)?;

    Ok(Rendered {
        envelope: Envelope::with_errors(meta, data, errors)?,
        records,
    })
}
