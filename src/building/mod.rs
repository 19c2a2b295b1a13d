//! Simulated buildings: records, results tables, and upgrade option parsing.

pub mod parameter;
pub mod record;

pub use parameter::{Parameter, UpgradeOption, normalize_parameter_name, parse_option};
pub use record::{BuildingRecord, ResultsTable};
