//! Raw record representation, CSV reading, and prepared CSV writing

use crate::error::{CoreError, CoreResult};
use crate::mapping::SchemaMapping;
use crate::scrub::CanonicalRecord;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// One raw input row: original header names to raw string values, in
/// header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Later duplicates of a header are kept but shadowed.
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.fields.push((header.into(), value.into()));
    }

    /// Value of the first field with this exact header
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(header, value)` pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read a delimited file into raw records, preserving file order.
///
/// Values are kept untrimmed; a leading BOM is stripped from header names.
/// Short rows yield records with fewer fields.
pub fn read_raw_csv(path: &Path, delimiter: char) -> CoreResult<Vec<RawRecord>> {
    if !path.exists() {
        return Err(CoreError::InputNotFound {
            path: path.display().to_string(),
        });
    }

    let csv_err = |e: csv::Error| CoreError::CsvRead {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter_byte(delimiter)?)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect(),
        );
    }

    log::info!(
        "Read {} rows and {} columns from {}",
        records.len(),
        headers.len(),
        path.display()
    );
    Ok(records)
}

/// Write scrubbed records as CSV with the mapping's column order.
///
/// Only columns that appear in at least one record are written; NULL is
/// written as an empty cell. Returns the number of data rows written.
pub fn write_prepared_csv(
    path: &Path,
    mapping: &SchemaMapping,
    records: &[CanonicalRecord],
) -> CoreResult<usize> {
    let write_err = |message: String| CoreError::CsvWrite {
        path: path.display().to_string(),
        message,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }

    let columns: Vec<&str> = mapping
        .columns()
        .iter()
        .map(|c| c.name)
        .filter(|name| records.iter().any(|r| r.contains_key(*name)))
        .collect();

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| write_err(e.to_string()))?;
    writer
        .write_record(&columns)
        .map_err(|e| write_err(e.to_string()))?;

    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|name| record.get(*name).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))?;

    log::info!("Saved {} prepared rows to {}", records.len(), path.display());
    Ok(records.len())
}

fn delimiter_byte(delimiter: char) -> CoreResult<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CoreError::ConfigInvalid {
            message: format!("Delimiter '{}' must be a single ASCII character", delimiter),
        })
}

#[cfg(test)]
#[path = "raw_test.rs"]
mod tests;
