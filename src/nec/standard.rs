//! NEC Article 220 Part III standard method for dwelling service sizing.

use super::{LoadInventory, NecCalculator, SERVICE_VOLTAGE, StandardMethodCalculator};
use crate::building::record::BuildingRecord;

/// Fastened appliances (220.53): 75 % demand factor from this count on.
const FASTENED_APPLIANCE_MIN_COUNT: usize = 4;
/// Dryer load floor (220.54).
const DRYER_MIN_VA: f64 = 5000.0;
/// EV supply equipment floor (220.57).
const EV_MIN_VA: f64 = 7200.0;

/// General lighting demand factors (Table 220.42): first 3000 VA at 100 %,
/// 3001 to 120000 VA at 35 %, the remainder at 25 %.
pub fn lighting_demand_va(general_va: f64) -> f64 {
    let first = general_va.min(3000.0);
    let second = (general_va.min(120_000.0) - 3000.0).max(0.0);
    let rest = (general_va - 120_000.0).max(0.0);
    first + 0.35 * second + 0.25 * rest
}

/// Demand load of a single household range (Table 220.55).
///
/// Ranges under 8.75 kW use 80 % of nameplate (columns A and B); ranges up
/// to 12 kW count as 8 kW (column C), increased by 5 % for each kW, or major
/// fraction, above 12 kW.
pub fn range_demand_va(nameplate_va: f64) -> f64 {
    if nameplate_va <= 0.0 {
        return 0.0;
    }
    let kw = nameplate_va / 1000.0;
    if kw < 8.75 {
        0.8 * nameplate_va
    } else if kw <= 12.0 {
        8000.0
    } else {
        8000.0 * (1.0 + 0.05 * (kw - 12.0).round())
    }
}

/// Total demand load (VA) by the standard method.
pub fn standard_demand_va(inventory: &LoadInventory) -> Option<f64> {
    let lighting = lighting_demand_va(inventory.general_va()?);

    let fastened = inventory.fastened_appliances_va();
    let fastened_count = fastened.iter().filter(|va| **va > 0.0).count();
    let fastened_sum: f64 = fastened.iter().sum();
    let fastened_demand = if fastened_count >= FASTENED_APPLIANCE_MIN_COUNT {
        0.75 * fastened_sum
    } else {
        fastened_sum
    };

    let dryer = if inventory.clothes_dryer_va > 0.0 {
        inventory.clothes_dryer_va.max(DRYER_MIN_VA)
    } else {
        0.0
    };
    let ev = if inventory.ev_charger_va > 0.0 {
        inventory.ev_charger_va.max(EV_MIN_VA)
    } else {
        0.0
    };

    Some(
        lighting
            + fastened_demand
            + dryer
            + range_demand_va(inventory.range_va)
            + ev
            + inventory.hvac_va(),
    )
}

impl StandardMethodCalculator for NecCalculator {
    fn min_amperage(&self, record: &BuildingRecord) -> Option<f64> {
        standard_demand_va(&self.inventory(record)).map(|va| va / SERVICE_VOLTAGE)
    }
}
