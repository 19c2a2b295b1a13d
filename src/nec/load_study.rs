//! NEC 220.87 load study: load added on top of the measured existing peak.

use super::{LoadInventory, LoadStudyCalculator, NecCalculator};
use crate::building::record::BuildingRecord;

/// Existing peak demand is counted at 125 % (220.87).
pub const EXISTING_PEAK_FACTOR: f64 = 1.25;

/// Non-HVAC end uses, each counted only when it becomes electric.
fn appliance_end_uses(inventory: &LoadInventory) -> [f64; 7] {
    [
        inventory.water_heater_va,
        inventory.clothes_dryer_va,
        inventory.range_va,
        inventory.dishwasher_va,
        inventory.pool_heater_va,
        inventory.hot_tub_heater_va,
        inventory.ev_charger_va,
    ]
}

/// Load added by newly electrified end uses.
///
/// An appliance end use counts at its full upgraded rating when it had no
/// electric load before the upgrade. Space conditioning counts only when
/// `new_hvac` is set, as the increase of the noncoincident HVAC load.
/// Equipment that was already electric adds nothing, whatever its rating.
pub fn incremental_load_va(
    baseline: &LoadInventory,
    upgraded: &LoadInventory,
    new_hvac: bool,
) -> f64 {
    let hvac = if new_hvac {
        (upgraded.hvac_va() - baseline.hvac_va()).max(0.0)
    } else {
        0.0
    };
    appliance_end_uses(baseline)
        .iter()
        .zip(appliance_end_uses(upgraded))
        .filter(|(before, after)| **before <= 0.0 && *after > 0.0)
        .fold(hvac, |total, (_, after)| total + after)
}

/// Projected service amperage: 125 % of the existing peak plus the new load.
pub fn projected_amp(baseline_peak_kw: f64, new_load_va: f64) -> f64 {
    (baseline_peak_kw * 1000.0 * EXISTING_PEAK_FACTOR + new_load_va) / super::SERVICE_VOLTAGE
}

impl LoadStudyCalculator for NecCalculator {
    fn new_load_va(
        &self,
        baseline: &BuildingRecord,
        upgraded: &BuildingRecord,
        new_hvac: bool,
    ) -> f64 {
        incremental_load_va(&self.inventory(baseline), &self.inventory(upgraded), new_hvac)
    }
}
