//! NEC 220.83: demand load of an existing dwelling receiving new loads.

use super::{LoadInventory, NecCalculator, NewLoadCalculator, NewLoadDemand};
use crate::building::record::BuildingRecord;

/// Portion of the "other" loads counted at 100 %; the remainder counts at 40 %.
const FULL_DEMAND_VA: f64 = 8000.0;
const REMAINDER_FACTOR: f64 = 0.4;

fn tiered(other_va: f64) -> f64 {
    other_va.min(FULL_DEMAND_VA) + REMAINDER_FACTOR * (other_va - FULL_DEMAND_VA).max(0.0)
}

/// Demand load (VA) under 220.83.
///
/// Without new space-conditioning equipment (220.83(A)) every load,
/// existing heating and cooling included, goes through the 8 kVA / 40 %
/// tiers. With new equipment (220.83(B)) the larger of heating and cooling
/// counts at 100 % and only the remaining loads are tiered.
pub fn new_load_demand_va(inventory: &LoadInventory, new_hvac: bool) -> Option<f64> {
    let other = inventory.general_va()?
        + inventory.fastened_appliances_va().iter().sum::<f64>()
        + inventory.clothes_dryer_va
        + inventory.range_va
        + inventory.ev_charger_va;

    Some(if new_hvac {
        inventory.hvac_va() + tiered(other)
    } else {
        tiered(other + inventory.hvac_va())
    })
}

impl NewLoadCalculator for NecCalculator {
    fn demand_load(&self, record: &BuildingRecord, new_hvac: bool) -> Option<NewLoadDemand> {
        new_load_demand_va(&self.inventory(record), new_hvac).map(NewLoadDemand::from_va)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inventory() -> LoadInventory {
        LoadInventory {
            floor_area_sqft: Some(1000.0),
            heating_va: 9000.0,
            cooling_va: 3000.0,
            water_heater_va: 5500.0,
            range_va: 12_000.0,
            ..LoadInventory::default()
        }
    }

    #[test]
    fn without_new_hvac_everything_is_tiered() {
        // other = 3000 + 4500 + 5500 + 12000 = 25000, plus hvac 9000 = 34000
        let expected = 8000.0 + 0.4 * 26_000.0;
        assert_relative_eq!(new_load_demand_va(&inventory(), false).unwrap_or(0.0), expected);
    }

    #[test]
    fn with_new_hvac_space_conditioning_at_full_demand() {
        let expected = 9000.0 + 8000.0 + 0.4 * 17_000.0;
        assert_relative_eq!(new_load_demand_va(&inventory(), true).unwrap_or(0.0), expected);
    }

    #[test]
    fn small_loads_stay_at_full_demand() {
        let inv = LoadInventory {
            floor_area_sqft: Some(500.0),
            ..LoadInventory::default()
        };
        assert_relative_eq!(new_load_demand_va(&inv, false).unwrap_or(0.0), 6000.0);
    }

    #[test]
    fn demand_converts_to_amperage() {
        let d = NewLoadDemand::from_va(24_000.0);
        assert_relative_eq!(d.min_amp, 100.0);
    }
}
