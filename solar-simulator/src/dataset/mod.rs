//! Static seasonal dataset: rows of local timestamp plus weighting factor.

pub mod csv_file;
pub mod json_file;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Timestamp layout of dataset rows, e.g. `14.06.2015 12:15`.
pub const ROW_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    /// Local wall-clock time in the source year; interpreted in the device timezone.
    pub local_time: NaiveDateTime,
    pub factor: f64,
}

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: missing {column} column")]
    MissingColumn { row: u64, column: &'static str },
    #[error("row {row}: invalid timestamp '{value}': {source}")]
    Timestamp {
        row: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("row {row}: invalid weighting factor '{value}': {source}")]
    Factor {
        row: u64,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Parse one raw `(timestamp, factor)` pair. `row` is 1-based and only used
/// for error reporting.
pub fn parse_row(row: u64, timestamp: &str, factor: &str) -> Result<DatasetRow, DatasetError> {
    let local_time = parse_local_time(row, timestamp)?;

    let factor_str = factor.trim();
    let factor = factor_str.parse::<f64>().map_err(|e| DatasetError::Factor {
        row,
        value: factor_str.to_string(),
        source: e,
    })?;

    Ok(DatasetRow { local_time, factor })
}

pub(crate) fn parse_local_time(row: u64, timestamp: &str) -> Result<NaiveDateTime, DatasetError> {
    let timestamp = timestamp.trim();
    NaiveDateTime::parse_from_str(timestamp, ROW_TIMESTAMP_FORMAT).map_err(|e| DatasetError::Timestamp {
        row,
        value: timestamp.to_string(),
        source: e,
    })
}

#[derive(Debug, Clone, Default)]
pub struct SeasonalDataset {
    rows: Vec<DatasetRow>,
}

impl SeasonalDataset {
    pub fn new(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    /// Load a dataset file. `.json` files hold an array of `[timestamp, factor]`
    /// pairs; anything else is read as two-column CSV.
    pub fn load(path: impl AsRef<Path>, has_headers: bool) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let rows = if is_json {
            json_file::load_json(path)?
        } else {
            csv_file::load_csv(path, has_headers)?
        };

        tracing::info!(path = %path.display(), rows = rows.len(), "seasonal dataset loaded");
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_day_month_year_rows() {
        let row = parse_row(1, " 14.06.2015 12:15 ", "0.25").unwrap();

        let expected = NaiveDate::from_ymd_opt(2015, 6, 14)
            .unwrap()
            .and_hms_opt(12, 15, 0)
            .unwrap();
        assert_eq!(row.local_time, expected);
        assert_eq!(row.factor, 0.25);
    }

    #[test]
    fn rejects_iso_timestamps() {
        let res = parse_row(3, "2015-06-14 12:15", "0.25");
        assert!(matches!(res, Err(DatasetError::Timestamp { row: 3, .. })));
    }

    #[test]
    fn rejects_non_numeric_factor() {
        let res = parse_row(9, "14.06.2015 12:15", "n/a");
        assert!(matches!(res, Err(DatasetError::Factor { row: 9, .. })));
    }
}
