//! Building records and results tables as read from the simulation outputs.

use std::collections::BTreeMap;

/// Column prefix of the sampled housing characteristics.
pub const CHARACTERISTIC_PREFIX: &str = "build_existing_model.";
/// Unique building key.
pub const BUILDING_ID: &str = "building_id";
/// Simulation completion status; only `"Success"` rows are analysed.
pub const COMPLETED_STATUS: &str = "completed_status";
/// Number of real buildings a simulated row stands for.
pub const SAMPLE_WEIGHT: &str = "sample_weight";
/// Human-readable upgrade package name.
pub const UPGRADE_NAME: &str = "apply_upgrade.upgrade_name";

const SUCCESS: &str = "Success";
const OPTION_NAME_PREFIX: &str = "upgrade_costs.option_";
const OPTION_NAME_SUFFIX: &str = "_name";

/// Returns true for cells that carry no value.
///
/// `"None"` is deliberately not missing: it is a categorical option
/// (e.g. a home without cooling).
pub fn is_missing(cell: &str) -> bool {
    matches!(cell.trim(), "" | "NA" | "N/A" | "NaN" | "nan" | "null")
}

/// Returns true when `column` holds an applied upgrade option name.
pub fn is_option_name_column(column: &str) -> bool {
    column.starts_with(OPTION_NAME_PREFIX) && column.ends_with(OPTION_NAME_SUFFIX)
}

/// One simulated building: its sampled characteristics plus every other
/// reported column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingRecord {
    pub building_id: u64,
    /// `build_existing_model.*` columns, keyed without the prefix.
    pub characteristics: BTreeMap<String, String>,
    /// All remaining columns, keyed by their full name.
    pub values: BTreeMap<String, String>,
}

impl BuildingRecord {
    pub fn new(building_id: u64) -> Self {
        Self {
            building_id,
            ..Self::default()
        }
    }

    /// Adds a characteristic (name without prefix).
    pub fn with_characteristic(mut self, name: &str, value: &str) -> Self {
        self.characteristics
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Adds a non-characteristic column.
    pub fn with_value(mut self, column: &str, value: impl ToString) -> Self {
        self.values.insert(column.to_string(), value.to_string());
        self
    }

    /// Stores a raw column, routing `build_existing_model.*` into the
    /// characteristics.
    pub fn insert_column(&mut self, column: &str, value: String) {
        match column.strip_prefix(CHARACTERISTIC_PREFIX) {
            Some(name) => {
                self.characteristics.insert(name.to_string(), value);
            }
            None => {
                self.values.insert(column.to_string(), value);
            }
        }
    }

    /// Characteristic value, or `None` when absent or missing.
    pub fn characteristic(&self, name: &str) -> Option<&str> {
        self.characteristics
            .get(name)
            .map(String::as_str)
            .filter(|v| !is_missing(v))
    }

    /// Whether the characteristics schema carries `name` at all.
    pub fn has_characteristic(&self, name: &str) -> bool {
        self.characteristics.contains_key(name)
    }

    /// Text value of a non-characteristic column.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|v| !is_missing(v))
    }

    /// Numeric value of a non-characteristic column; unparseable or NaN
    /// cells are `None`.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.text(column)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
    }

    pub fn sample_weight(&self) -> Option<f64> {
        self.number(SAMPLE_WEIGHT)
    }

    pub fn completed_successfully(&self) -> bool {
        self.text(COMPLETED_STATUS) == Some(SUCCESS)
    }

    pub fn is_vacant(&self) -> bool {
        self.characteristic("vacancy_status") == Some("Vacant")
    }

    pub fn upgrade_name(&self) -> Option<&str> {
        self.text(UPGRADE_NAME)
    }

    /// `(column, "Parameter|Option")` for every applied option on this row.
    pub fn option_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(column, value)| is_option_name_column(column) && !is_missing(value))
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }
}

/// A results table keyed and ordered by building id.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    records: BTreeMap<u64, BuildingRecord>,
}

impl ResultsTable {
    pub fn from_records(records: impl IntoIterator<Item = BuildingRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.building_id, r))
                .collect(),
        }
    }

    /// Drops rows whose simulation did not complete; returns how many were dropped.
    pub fn retain_successful(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.completed_successfully());
        before - self.records.len()
    }

    pub fn get(&self, building_id: u64) -> Option<&BuildingRecord> {
        self.records.get(&building_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingRecord> {
        self.records.values()
    }

    /// Pairs rows present in both tables, ordered by building id. Buildings
    /// missing from either side are dropped.
    pub fn aligned<'a>(
        &'a self,
        other: &'a ResultsTable,
    ) -> Vec<(&'a BuildingRecord, &'a BuildingRecord)> {
        self.records
            .iter()
            .filter_map(|(id, mine)| other.records.get(id).map(|theirs| (mine, theirs)))
            .collect()
    }
}
