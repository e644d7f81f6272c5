//! CSV ingestion and cleaning.
//!
//! Two entry points: [`clean_raw`] for an uncleaned fundamentals export
//! (market cap in raw currency units, gaps allowed) and [`read_cleaned`] for
//! data that already went through cleaning (market cap in billions).
//! Columns not listed here are ignored.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;
use tracing::{info, warn};

use crate::{IngestError, Metric, MetricValues, StockRecord, Ticker, ValidationError};

pub const CODE_COLUMN: &str = "Code";
pub const NAME_COLUMN: &str = "Name";
pub const SECTOR_COLUMN: &str = "Sector";
pub const MARKET_CAP_COLUMN: &str = "MarketCapitalization";
pub const RATING_COLUMN: &str = "Overall Rating";

const UNITS_PER_BILLION: f64 = 1_000_000_000.0;

/// A row removed during cleaning and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<DroppedRow>,
}

struct Columns {
    code: usize,
    name: usize,
    sector: usize,
    market_cap: usize,
    metrics: [usize; 6],
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| IngestError::MissingColumn(name.to_owned()))
        };

        let code = find(CODE_COLUMN)?;
        let name = find(NAME_COLUMN)?;
        let sector = find(SECTOR_COLUMN)?;
        let market_cap = find(MARKET_CAP_COLUMN)?;
        let mut metrics = [0; 6];
        for metric in Metric::ALL {
            metrics[metric.index()] = find(metric.label())?;
        }

        Ok(Self {
            code,
            name,
            sector,
            market_cap,
            metrics,
        })
    }

    fn text<'r>(&self, row: &'r StringRecord, index: usize) -> Option<&'r str> {
        row.get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn metrics(&self, row: &StringRecord) -> MetricValues {
        let mut values = MetricValues::default();
        for metric in Metric::ALL {
            values.set(metric, row.get(self.metrics[metric.index()]).and_then(parse_number));
        }
        values
    }
}

/// Load an uncleaned export, dropping every row with a gap in a required
/// column and converting market cap to billions.
pub fn clean_raw<R: Read>(reader: R) -> Result<(Vec<StockRecord>, CleaningReport), IngestError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut report = CleaningReport::default();
    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        report.rows_read += 1;
        let line = line_of(&row, index);

        match clean_row(&columns, &row) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(line, %reason, "dropped row during cleaning");
                report.dropped.push(DroppedRow { line, reason });
            }
        }
    }
    report.rows_kept = records.len();

    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        dropped = report.dropped.len(),
        "cleaned fundamentals"
    );
    Ok((records, report))
}

/// Load already-cleaned records. Market cap must be present; an empty metric
/// cell stays absent and surfaces later as missing data.
pub fn read_cleaned<R: Read>(reader: R) -> Result<Vec<StockRecord>, IngestError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let line = line_of(&row, index);
        let record = cleaned_row(&columns, &row).map_err(|source| IngestError::InvalidRow {
            row: line as usize,
            source,
        })?;
        records.push(record);
    }

    info!(rows = records.len(), "loaded cleaned fundamentals");
    Ok(records)
}

pub fn clean_raw_path(path: &Path) -> Result<(Vec<StockRecord>, CleaningReport), IngestError> {
    clean_raw(File::open(path)?)
}

pub fn read_cleaned_path(path: &Path) -> Result<Vec<StockRecord>, IngestError> {
    read_cleaned(File::open(path)?)
}

/// Write records as CSV with an `Overall Rating` column.
pub fn write_rated<W: Write>(records: &[StockRecord], writer: W) -> Result<(), IngestError> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut header = vec![CODE_COLUMN, NAME_COLUMN, SECTOR_COLUMN, MARKET_CAP_COLUMN];
    header.extend(Metric::ALL.iter().map(|metric| metric.label()));
    header.push(RATING_COLUMN);
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.code.to_string(),
            record.name.clone(),
            record.sector.clone(),
            record.market_cap.to_string(),
        ];
        row.extend(
            Metric::ALL
                .iter()
                .map(|metric| format_optional(record.metrics.get(*metric))),
        );
        row.push(format_optional(record.overall_rating));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn clean_row(columns: &Columns, row: &StringRecord) -> Result<StockRecord, String> {
    let code = columns
        .text(row, columns.code)
        .ok_or_else(|| format!("missing {CODE_COLUMN}"))?;
    let name = columns
        .text(row, columns.name)
        .ok_or_else(|| format!("missing {NAME_COLUMN}"))?;
    let sector = columns
        .text(row, columns.sector)
        .ok_or_else(|| format!("missing {SECTOR_COLUMN}"))?;
    let raw_cap = row
        .get(columns.market_cap)
        .and_then(parse_number)
        .ok_or_else(|| format!("missing {MARKET_CAP_COLUMN}"))?;

    let metrics = columns.metrics(row);
    if let Some(metric) = metrics.first_missing() {
        return Err(format!("missing {metric}"));
    }

    let code = Ticker::parse(code).map_err(|error| error.to_string())?;
    let market_cap = raw_cap.trunc() / UNITS_PER_BILLION;
    StockRecord::new(code, name, sector, market_cap, metrics).map_err(|error| error.to_string())
}

fn cleaned_row(columns: &Columns, row: &StringRecord) -> Result<StockRecord, ValidationError> {
    let code = Ticker::parse(columns.text(row, columns.code).unwrap_or_default())?;
    let sector = columns
        .text(row, columns.sector)
        .ok_or(ValidationError::EmptySector)?;
    let market_cap = row
        .get(columns.market_cap)
        .and_then(parse_number)
        .ok_or(ValidationError::NonFiniteValue {
            field: MARKET_CAP_COLUMN,
        })?;

    StockRecord::new(
        code,
        columns.text(row, columns.name).unwrap_or_default(),
        sector,
        market_cap,
        columns.metrics(row),
    )
}

/// Finite number, or `None` for blanks, `NaN` markers and junk.
fn parse_number(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn line_of(row: &StringRecord, index: usize) -> u64 {
    row.position()
        .map(|position| position.line())
        .unwrap_or(index as u64 + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = ",Code,Name,Sector,MarketCapitalization,PERatio,Earnings/Share,DividendYieldRatio,BookValue/Share,Revenue/Share,D/ERatio";

    #[test]
    fn parse_number_rejects_markers() {
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("None"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn cleaning_converts_market_cap_to_billions() {
        let input = format!(
            "{HEADER}\n0,AAPL,Apple Inc,Technology,2.5e12,28.1,6.1,0.0055,3.6,24.3,1.4\n"
        );
        let (records, report) = clean_raw(input.as_bytes()).expect("clean");

        assert_eq!(report.rows_kept, 1);
        assert_eq!(records[0].market_cap, 2_500.0);
        assert_eq!(records[0].metrics.get(Metric::PeRatio), Some(28.1));
    }

    #[test]
    fn cleaning_truncates_fractional_units() {
        let input = format!("{HEADER}\n0,XYZ,Xyz,Tech,1999999999.9,1,1,1,1,1,1\n");
        let (records, _) = clean_raw(input.as_bytes()).expect("clean");
        assert_eq!(records[0].market_cap, 1.999_999_999);
    }

    #[test]
    fn cleaning_drops_incomplete_rows() {
        let input = format!(
            "{HEADER}\n\
             0,AAA,Alpha,Tech,1e9,10,1,0.01,5,5,0.5\n\
             1,BBB,Beta,Tech,1e9,,1,0.01,5,5,0.5\n\
             2,CCC,,Tech,1e9,10,1,0.01,5,5,0.5\n\
             3,DDD,Delta,Tech,1e9,10,1,NaN,5,5,0.5\n"
        );
        let (records, report) = clean_raw(input.as_bytes()).expect("clean");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code.as_str(), "AAA");
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.dropped.len(), 3);
        assert_eq!(report.dropped[0].line, 3);
        assert!(report.dropped[0].reason.contains("PERatio"));
        assert!(report.dropped[2].reason.contains("DividendYieldRatio"));
    }

    #[test]
    fn missing_column_is_reported() {
        let input = "Code,Name,Sector\nAAA,Alpha,Tech\n";
        let err = read_cleaned(input.as_bytes()).expect_err("must fail");
        assert!(matches!(err, IngestError::MissingColumn(ref column) if column == "MarketCapitalization"));
    }

    #[test]
    fn cleaned_reader_keeps_gaps_as_absent() {
        let input = format!("{HEADER}\n0,AAA,Alpha,Tech,12.5,10,1,,5,5,0.5\n");
        let records = read_cleaned(input.as_bytes()).expect("read");

        assert_eq!(records[0].market_cap, 12.5);
        assert_eq!(records[0].metrics.first_missing(), Some(Metric::DividendYield));
    }

    #[test]
    fn cleaned_reader_rejects_blank_ticker() {
        let input = format!("{HEADER}\n0,  ,Alpha,Tech,12.5,10,1,1,5,5,0.5\n");
        let err = read_cleaned(input.as_bytes()).expect_err("must fail");
        assert!(matches!(
            err,
            IngestError::InvalidRow {
                row: 2,
                source: ValidationError::EmptyTicker
            }
        ));
    }

    #[test]
    fn writes_rating_column() {
        let mut record = StockRecord::new(
            Ticker::parse("AAA").expect("ticker"),
            "Alpha",
            "Tech",
            12.5,
            MetricValues::complete([10.0, 1.0, 0.01, 5.0, 5.0, 0.5]),
        )
        .expect("record");
        record.overall_rating = Some(63.7);

        let mut buffer = Vec::new();
        write_rated(&[record], &mut buffer).expect("write");
        let rendered = String::from_utf8(buffer).expect("utf8");
        let mut lines = rendered.lines();

        assert!(lines.next().expect("header").ends_with("D/ERatio,Overall Rating"));
        assert_eq!(
            lines.next().expect("row"),
            "AAA,Alpha,Tech,12.5,10,1,0.01,5,5,0.5,63.7"
        );
    }
}
