//! CSV results tables.
//!
//! A results table has one row per building: a `building_id` column, a
//! `completed_status` column, `build_existing_model.*` characteristic
//! columns, and any number of output columns. Only rows that completed
//! successfully are kept.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::building::record::{BUILDING_ID, BuildingRecord, COMPLETED_STATUS, ResultsTable};
use crate::error::{PanelError, Result};

/// File extension of results tables.
pub const TABLE_EXTENSION: &str = "csv";

/// Path of results table `index` for a community: `upNN__{community}.csv`.
/// Index 0 is the baseline.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use panel_upgrade::io::table_path;
///
/// let p = table_path(Path::new("data"), "san_jose", 3);
/// assert_eq!(p, Path::new("data/up03__san_jose.csv"));
/// ```
pub fn table_path(data_dir: &Path, community: &str, index: usize) -> PathBuf {
    data_dir.join(format!("up{index:02}__{community}.{TABLE_EXTENSION}"))
}

/// Reads a results table from a CSV file.
///
/// # Errors
///
/// Returns `PanelError::Io` if the file cannot be opened, and the errors of
/// [`read_table_from`] otherwise.
pub fn read_table(path: &Path) -> Result<ResultsTable> {
    let file = File::open(path).map_err(|e| PanelError::io(path, e))?;
    let table = read_table_from(io::BufReader::new(file), path)?;
    info!(path = %path.display(), buildings = table.len(), "loaded results table");
    Ok(table)
}

/// Reads a results table from any reader; `path` only labels errors.
///
/// A repeated `building_id` is logged as a warning and only its first row is
/// kept.
///
/// # Errors
///
/// - `PanelError::Csv` on malformed CSV.
/// - `PanelError::MissingColumn` if `building_id` or `completed_status` is absent.
/// - `PanelError::InvalidBuildingId` if a building id is not an unsigned integer.
pub fn read_table_from(reader: impl Read, path: &Path) -> Result<ResultsTable> {
    let mut rdr = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
    let headers = rdr.headers().map_err(|e| PanelError::csv(path, e))?.clone();

    for required in [BUILDING_ID, COMPLETED_STATUS] {
        if !headers.iter().any(|h| h == required) {
            return Err(PanelError::MissingColumn {
                path: path.to_path_buf(),
                column: required.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    for (row, result) in rdr.records().enumerate() {
        let row_data = result.map_err(|e| PanelError::csv(path, e))?;
        let mut building_id = None;
        let mut record = BuildingRecord::new(0);
        for (column, value) in headers.iter().zip(row_data.iter()) {
            if column == BUILDING_ID {
                building_id = Some(parse_building_id(value, path, row + 1)?);
            } else {
                record.insert_column(column, value.to_string());
            }
        }
        let Some(id) = building_id else { continue };
        if !seen.insert(id) {
            warn!(
                path = %path.display(),
                building_id = id,
                row = row + 1,
                "duplicate building_id, keeping the first row"
            );
            continue;
        }
        record.building_id = id;
        records.push(record);
    }

    let mut table = ResultsTable::from_records(records);
    let dropped = table.retain_successful();
    if dropped > 0 {
        debug!(path = %path.display(), dropped, "dropped rows that did not complete");
    }
    Ok(table)
}

fn parse_building_id(value: &str, path: &Path, row: usize) -> Result<u64> {
    let trimmed = value.trim();
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| {
            // Some exports write integer ids as floats ("12.0").
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u64::MAX as f64)
                .map(|v| v as u64)
        })
        .ok_or_else(|| PanelError::InvalidBuildingId {
            path: path.to_path_buf(),
            row,
            value: value.to_string(),
        })
}
