use std::io::{self, Write};

use serde_json::Value;
use sfa_core::{ingest, Envelope, Metric, StockRecord};

use crate::cli::OutputFormat;
use crate::commands::Rendered;
use crate::error::CliError;

pub fn render(rendered: &Rendered, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let envelope = &rendered.envelope;
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Ndjson => render_ndjson(envelope, rendered.records.as_deref())?,
        OutputFormat::Table => render_table(envelope, rendered.records.as_deref())?,
        OutputFormat::Csv => {
            let records = rendered.records.as_deref().ok_or_else(|| {
                CliError::Usage(String::from(
                    "csv output needs a single tier of rated records; pass --tier to `rate`",
                ))
            })?;
            ingest::write_rated(records, io::stdout().lock())?;
        }
    }

    Ok(())
}

/// Metadata line first, then one line per rated record when there are any.
fn render_ndjson(envelope: &Envelope<Value>, records: Option<&[StockRecord]>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let Some(records) = records else {
        writeln!(out, "{}", serde_json::to_string(envelope)?)?;
        return Ok(());
    };

    writeln!(out, "{}", serde_json::to_string(&envelope.meta)?)?;
    for record in records {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    for error in &envelope.errors {
        writeln!(out, "{}", serde_json::to_string(error)?)?;
    }
    Ok(())
}

fn render_table(envelope: &Envelope<Value>, records: Option<&[StockRecord]>) -> Result<(), CliError> {
    println!("request_id  : {}", envelope.meta.request_id);
    if let Some(trace_id) = &envelope.meta.trace_id {
        println!("trace_id    : {trace_id}");
    }
    println!("schema      : {}", envelope.meta.schema_version);
    println!("generated_at: {}", envelope.meta.generated_at);
    if let Some(exchange) = &envelope.meta.exchange {
        println!("exchange    : {exchange}");
    }
    println!("latency_ms  : {}", envelope.meta.latency_ms);

    if !envelope.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &envelope.meta.warnings {
            println!("  - {warning}");
        }
    }

    match records {
        Some(records) => print_records(records),
        None => {
            println!("data:");
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                println!("  {line}");
            }
        }
    }

    if !envelope.errors.is_empty() {
        println!("errors:");
        for error in &envelope.errors {
            match &error.ticker {
                Some(ticker) => println!("  - {} [{ticker}]: {}", error.code, error.message),
                None => println!("  - {}: {}", error.code, error.message),
            }
        }
    }

    Ok(())
}

fn print_records(records: &[StockRecord]) {
    let code_width = records
        .iter()
        .map(|record| record.code.as_str().len())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);
    let sector_width = records
        .iter()
        .map(|record| record.sector.len())
        .chain(std::iter::once(6))
        .max()
        .unwrap_or(6);

    let mut header = format!("{:<code_width$}  {:<sector_width$}  {:>10}", "Code", "Sector", "Cap");
    for metric in Metric::ALL {
        header.push_str(&format!("  {:>18}", metric.label()));
    }
    header.push_str("  Rating");
    println!("{header}");

    for record in records {
        let mut line = format!(
            "{:<code_width$}  {:<sector_width$}  {:>10.2}",
            record.code.as_str(),
            record.sector,
            record.market_cap
        );
        for metric in Metric::ALL {
            match record.metrics.get(metric) {
                Some(value) => line.push_str(&format!("  {value:>18.4}")),
                None => line.push_str(&format!("  {:>18}", "-")),
            }
        }
        match record.overall_rating {
            Some(rating) => line.push_str(&format!("  {rating:.2}")),
            None => line.push_str("  -"),
        }
        println!("{line}");
    }
}
