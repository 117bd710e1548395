//! Historical observation loading from delimited text files.

use crate::config::DataConfig;
use crate::error::YieldError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One past (region, crop, yield) record. Only complete rows are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Region name exactly as stored, surrounding whitespace included.
    pub region: String,
    /// Crop label as stored; case is preserved.
    pub crop: String,
    pub yield_value: f64,
}

impl Observation {
    pub fn new(region: impl Into<String>, crop: impl Into<String>, yield_value: f64) -> Self {
        Self {
            region: region.into(),
            crop: crop.into(),
            yield_value,
        }
    }
}

/// Summary of a load for lineage and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub location: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

/// The loaded, immutable observation table.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    rows: Vec<Observation>,
    report: LoadReport,
}

impl ObservationTable {
    /// Build from already-clean rows (tests, in-memory sources).
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        let count = rows.len();
        Self {
            rows,
            report: LoadReport {
                location: "memory".to_string(),
                loaded_at: chrono::Utc::now(),
                rows_read: count,
                rows_kept: count,
                rows_dropped: 0,
            },
        }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// CSV source for the observation table.
pub struct ObservationSource {
    pub path: PathBuf,
    pub delimiter: u8,
    pub region_column: String,
    pub crop_column: String,
    pub yield_column: String,
}

impl ObservationSource {
    pub fn from_config(config: &DataConfig) -> Result<Self, YieldError> {
        if !config.delimiter.is_ascii() {
            return Err(YieldError::config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                config.delimiter
            )));
        }
        Ok(Self {
            path: config.observations_path.clone(),
            delimiter: config.delimiter as u8,
            region_column: config.region_column.clone(),
            crop_column: config.crop_column.clone(),
            yield_column: config.yield_column.clone(),
        })
    }

    /// Read the table, keeping only the three needed columns and dropping any
    /// row where one of them is missing or unusable.
    pub fn load(&self) -> Result<ObservationTable, YieldError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            YieldError::data_load(format!(
                "failed to open observations {}: {e}",
                self.path.display()
            ))
        })?;
        self.load_from_reader(file, &self.path.display().to_string())
    }

    pub fn load_from_reader<R: std::io::Read>(
        &self,
        reader: R,
        location: &str,
    ) -> Result<ObservationTable, YieldError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| YieldError::data_load(format!("unreadable header in {location}: {e}")))?
            .clone();
        let region_idx = column_index(&headers, &self.region_column, location)?;
        let crop_idx = column_index(&headers, &self.crop_column, location)?;
        let yield_idx = column_index(&headers, &self.yield_column, location)?;

        let mut rows = Vec::new();
        let mut rows_read = 0usize;
        for record in csv.records() {
            rows_read += 1;
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(row = rows_read, error = %e, "Dropping malformed record");
                    continue;
                }
            };
            // Region is kept verbatim; a blank cell still counts as missing.
            let region = record.get(region_idx).unwrap_or_default();
            let crop = record.get(crop_idx).unwrap_or_default();
            let yield_value = record.get(yield_idx).and_then(parse_yield);

            match yield_value {
                Some(y) if !region.trim().is_empty() && !crop.trim().is_empty() => {
                    rows.push(Observation::new(region, crop, y));
                }
                _ => {}
            }
        }

        let rows_kept = rows.len();
        let rows_dropped = rows_read - rows_kept;
        if rows_dropped > 0 {
            tracing::warn!(
                location,
                rows_dropped,
                "Dropped observations with missing region, crop, or yield"
            );
        }
        let report = LoadReport {
            location: location.to_string(),
            loaded_at: chrono::Utc::now(),
            rows_read,
            rows_kept,
            rows_dropped,
        };
        tracing::info!(location, rows_read, rows_kept, "Loaded historical observations");
        Ok(ObservationTable { rows, report })
    }
}

fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    location: &str,
) -> Result<usize, YieldError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            YieldError::data_load(format!("{location} has no '{name}' column"))
        })
}

/// Parse a yield cell. Blank, unparseable, and NaN cells count as missing.
fn parse_yield(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}
