use std::{fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};
use waterguard_client::domain::{UsageRecord, UsageSeries};

use crate::pipeline::{DataOrigin, PipelineError, Source};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const USAGE_COLUMN: &str = "usage_liters";

enum CsvInput {
    File(PathBuf),
    Upload(Vec<u8>),
}

/// CSV source for hourly water usage.
///
/// Expected header columns (by name, any order, extras ignored):
/// - timestamp (RFC3339, `YYYY-MM-DD HH:MM[:SS[.fff]]` with a space or `T`,
///   or a bare `YYYY-MM-DD`)
/// - usage_liters (liters in that hour)
///
/// A single bad row rejects the whole file.
pub struct UsageCsvSource {
    input: CsvInput,
}

impl UsageCsvSource {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            input: CsvInput::File(path.into()),
        }
    }

    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self {
            input: CsvInput::Upload(bytes.into()),
        }
    }
}

impl Source for UsageCsvSource {
    fn load(&self) -> Result<UsageSeries, PipelineError> {
        let records = match &self.input {
            CsvInput::File(path) => {
                let file = File::open(path)
                    .map_err(|e| PipelineError::InvalidInput(format!("failed to open CSV file: {e}")))?;
                parse_usage_csv(file)?
            }
            CsvInput::Upload(bytes) => parse_usage_csv(bytes.as_slice())?,
        };

        tracing::info!(records = records.len(), "usage CSV loaded");
        Ok(UsageSeries::from_records(records))
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::Uploaded
    }
}

fn parse_usage_csv<R: Read>(reader: R) -> Result<Vec<UsageRecord>, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::InvalidInput(format!("failed to read CSV headers: {e}")))?
        .clone();

    let ts_idx = column_index(&headers, TIMESTAMP_COLUMN)?;
    let usage_idx = column_index(&headers, USAGE_COLUMN)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result
            .map_err(|e| PipelineError::InvalidInput(format!("failed to read CSV record: {e}")))?;

        match record_to_usage(&record, ts_idx, usage_idx) {
            Ok(u) => records.push(u),
            Err(e) => {
                metrics::counter!("usage_csv_parse_errors_total").increment(1);
                return Err(e);
            }
        }
    }

    Ok(records)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PipelineError::InvalidInput(format!("missing required column '{name}'")))
}

fn record_to_usage(
    record: &StringRecord,
    ts_idx: usize,
    usage_idx: usize,
) -> Result<UsageRecord, PipelineError> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();

    let ts_str = field(record, ts_idx, TIMESTAMP_COLUMN, line)?;
    let timestamp = parse_timestamp(ts_str).ok_or_else(|| {
        PipelineError::InvalidInput(format!("line {line}: invalid {TIMESTAMP_COLUMN} '{ts_str}'"))
    })?;

    let usage_str = field(record, usage_idx, USAGE_COLUMN, line)?;
    let usage_liters: f64 = usage_str.parse().map_err(|e| {
        PipelineError::InvalidInput(format!("line {line}: invalid {USAGE_COLUMN} '{usage_str}': {e}"))
    })?;

    Ok(UsageRecord::new(timestamp, usage_liters))
}

fn field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, PipelineError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| PipelineError::InvalidInput(format!("line {line}: missing '{name}' value")))
}

/// Parses a timestamp into wall-clock time.
///
/// An RFC3339 offset is dropped after parsing, so the record keeps the local
/// time it was written in.
pub fn parse_timestamp(s: &str) -> Option<PrimitiveDateTime> {
    if let Ok(odt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(PrimitiveDateTime::new(odt.date(), odt.time()));
    }

    PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")))
    .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")))
    .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]")))
    .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]")))
    .ok()
    .or_else(|| {
        Date::parse(s, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(Date::midnight)
    })
}
