use std::{fs::File, io::Read, path::Path};

use super::{parse_row, DatasetError, DatasetRow};

/// Read a two-column CSV dataset: timestamp, weighting factor.
pub fn read_csv<R: Read>(reader: R, has_headers: bool) -> Result<Vec<DatasetRow>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let row = record.position().map_or(idx as u64 + 1, |p| p.line());

        let timestamp = record
            .get(0)
            .ok_or(DatasetError::MissingColumn { row, column: "timestamp" })?;
        let factor = record
            .get(1)
            .ok_or(DatasetError::MissingColumn { row, column: "factor" })?;

        match parse_row(row, timestamp, factor) {
            Ok(parsed) => rows.push(parsed),
            Err(e) => {
                metrics::counter!("dataset_parse_errors_total").increment(1);
                return Err(e);
            }
        }
    }

    Ok(rows)
}

pub fn load_csv(path: &Path, has_headers: bool) -> Result<Vec<DatasetRow>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_csv(file, has_headers)
}
