use std::{fs, path::Path};

use serde::Deserialize;

use super::{parse_local_time, parse_row, DatasetError, DatasetRow};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFactor {
    Text(String),
    Number(f64),
}

/// Parse a JSON array of `[timestamp, factor]` pairs. Factors may be given as
/// decimal strings or numbers.
pub fn parse_json(contents: &str) -> Result<Vec<DatasetRow>, DatasetError> {
    let raw: Vec<(String, RawFactor)> = serde_json::from_str(contents)?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, (timestamp, factor))| {
            let row = idx as u64 + 1;
            let parsed = match factor {
                RawFactor::Text(text) => parse_row(row, &timestamp, &text),
                RawFactor::Number(factor) => parse_local_time(row, &timestamp)
                    .map(|local_time| DatasetRow { local_time, factor }),
            };
            if parsed.is_err() {
                metrics::counter!("dataset_parse_errors_total").increment(1);
            }
            parsed
        })
        .collect()
}

pub fn load_json(path: &Path) -> Result<Vec<DatasetRow>, DatasetError> {
    let contents = fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_json(&contents)
}
