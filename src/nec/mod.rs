//! National Electrical Code load calculations.
//!
//! The estimator consumes these calculations through small traits so that a
//! different calculator (or a test double) can be swapped in. [`NecCalculator`]
//! is the built-in implementation of all three, driven by a [`LoadInventory`]
//! and configurable nameplate ratings.

pub mod load_study;
pub mod loads;
pub mod new_load;
pub mod standard;

use crate::building::record::BuildingRecord;
use crate::config::NameplateConfig;

pub use loads::LoadInventory;

/// Service voltage of a single-phase residential panel (V).
pub const SERVICE_VOLTAGE: f64 = 240.0;

/// Minimum service amperage by the NEC standard method (Article 220 Part III).
pub trait StandardMethodCalculator {
    /// Minimum amperage before rounding to a panel size, `None` when the
    /// building lacks the characteristics the calculation needs.
    fn min_amperage(&self, record: &BuildingRecord) -> Option<f64>;
}

/// Demand load of a building under NEC 220.83 (existing dwelling, new loads).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewLoadDemand {
    /// Total demand load (VA).
    pub total_va: f64,
    /// `total_va` expressed as a minimum service amperage.
    pub min_amp: f64,
}

impl NewLoadDemand {
    pub fn from_va(total_va: f64) -> Self {
        Self {
            total_va,
            min_amp: total_va / SERVICE_VOLTAGE,
        }
    }
}

/// NEC 220.83 demand load calculator.
pub trait NewLoadCalculator {
    /// Demand load of `record`; `new_hvac` selects 220.83(B), where new
    /// heating or cooling equipment is being installed.
    fn demand_load(&self, record: &BuildingRecord, new_hvac: bool) -> Option<NewLoadDemand>;
}

/// NEC 220.87 load-study calculator.
pub trait LoadStudyCalculator {
    /// Load (VA) that newly electrified end uses add to the existing service
    /// when moving from `baseline` to `upgraded`. `new_hvac` marks newly
    /// electrified space conditioning. Never negative.
    fn new_load_va(
        &self,
        baseline: &BuildingRecord,
        upgraded: &BuildingRecord,
        new_hvac: bool,
    ) -> f64;
}

/// Built-in NEC calculator.
#[derive(Debug, Clone, Default)]
pub struct NecCalculator {
    nameplate: NameplateConfig,
}

impl NecCalculator {
    pub fn new(nameplate: NameplateConfig) -> Self {
        Self { nameplate }
    }

    pub fn inventory(&self, record: &BuildingRecord) -> LoadInventory {
        LoadInventory::from_record(record, &self.nameplate)
    }
}
