//! Electrical load inventory of a building, derived from its characteristics.

use crate::building::record::BuildingRecord;
use crate::config::NameplateConfig;

/// Watts per kBtu/h.
pub const W_PER_KBTU_H: f64 = 293.071;

/// General lighting and receptacle load (NEC 220.12), VA per ft².
pub const LIGHTING_VA_PER_SQFT: f64 = 3.0;
/// Two small-appliance branch circuits plus one laundry circuit at 1500 VA.
pub const SMALL_APPLIANCE_AND_LAUNDRY_VA: f64 = 3.0 * 1500.0;

const HEATING_CAPACITY: &str = "upgrade_costs.size_heating_system_primary_k_btu_h";
const HEAT_PUMP_BACKUP_CAPACITY: &str = "upgrade_costs.size_heat_pump_backup_primary_k_btu_h";
const COOLING_CAPACITY: &str = "upgrade_costs.size_cooling_system_primary_k_btu_h";

/// Representative conditioned floor area (ft²) per `geometry_floor_area` bin.
const FLOOR_AREA_BINS: &[(&str, f64)] = &[
    ("0-499", 298.0),
    ("500-749", 634.0),
    ("750-999", 881.0),
    ("1000-1499", 1228.0),
    ("1500-1999", 1698.0),
    ("2000-2499", 2179.0),
    ("2500-2999", 2678.0),
    ("3000-3999", 3310.0),
    ("4000+", 5587.0),
];

const HEAT_PUMPS: &[&str] = &["ASHP", "MSHP", "GSHP"];
const RESISTANCE_HEATERS: &[&str] = &[
    "Electric Baseboard",
    "Electric Boiler",
    "Electric Furnace",
    "Electric Wall Furnace",
];

/// Electric loads of one building, in VA. Non-electric end uses are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadInventory {
    /// Conditioned floor area; `None` when the bin is missing or unrecognized.
    pub floor_area_sqft: Option<f64>,
    pub heating_va: f64,
    pub cooling_va: f64,
    pub water_heater_va: f64,
    pub clothes_dryer_va: f64,
    pub range_va: f64,
    pub dishwasher_va: f64,
    pub pool_heater_va: f64,
    pub hot_tub_heater_va: f64,
    pub ev_charger_va: f64,
}

impl LoadInventory {
    /// Builds the inventory from a record's characteristics and sizing columns.
    pub fn from_record(record: &BuildingRecord, nameplate: &NameplateConfig) -> Self {
        let heating_w = capacity_w(record, HEATING_CAPACITY, nameplate.heating_capacity_kbtu_h);
        let backup_w = capacity_w(
            record,
            HEAT_PUMP_BACKUP_CAPACITY,
            nameplate.heat_pump_backup_kbtu_h,
        );
        let cooling_w = capacity_w(record, COOLING_CAPACITY, nameplate.cooling_capacity_kbtu_h);

        let heating_system = record
            .characteristic("hvac_heating_efficiency")
            .map(system_kind)
            .unwrap_or_default();
        let heating_va = if HEAT_PUMPS.contains(&heating_system) {
            heating_w / nameplate.heat_pump_cop + backup_w
        } else if RESISTANCE_HEATERS.contains(&heating_system)
            || record
                .characteristic("hvac_shared_efficiencies")
                .is_some_and(|o| o.split(',').any(|s| s.trim() == "Electricity"))
        {
            heating_w
        } else {
            0.0
        };

        let cooling_va = match record.characteristic("hvac_cooling_efficiency") {
            None | Some("None") => 0.0,
            Some(_) => cooling_w / nameplate.cooling_cop,
        };

        let water_heater_va = match record.characteristic("water_heater_efficiency") {
            Some(o) if o.starts_with("Electric Heat Pump") => nameplate.water_heater_heat_pump_va,
            Some(o) if o.starts_with("Electric Tankless") => nameplate.water_heater_tankless_va,
            Some(o) if o.starts_with("Electric") => nameplate.water_heater_resistance_va,
            _ if record.characteristic("water_heater_fuel") == Some("Electricity") => {
                nameplate.water_heater_resistance_va
            }
            _ => 0.0,
        };

        let dishwasher_va = match record.characteristic("dishwasher") {
            None | Some("None" | "Void") => 0.0,
            Some(_) => nameplate.dishwasher_va,
        };
        let ev_charger_va = match record.characteristic("electric_vehicle") {
            None | Some("None") => 0.0,
            Some(_) => nameplate.ev_charger_va,
        };

        Self {
            floor_area_sqft: record.characteristic("geometry_floor_area").and_then(floor_area_sqft),
            heating_va,
            cooling_va,
            water_heater_va,
            clothes_dryer_va: electric_va(record, "clothes_dryer", nameplate.clothes_dryer_va),
            range_va: electric_va(record, "cooking_range", nameplate.range_va),
            dishwasher_va,
            pool_heater_va: electric_va(record, "misc_pool_heater", nameplate.pool_heater_va),
            hot_tub_heater_va: electric_va(record, "misc_hot_tub_spa", nameplate.hot_tub_heater_va),
            ev_charger_va,
        }
    }

    /// Noncoincident space-conditioning load (NEC 220.60): the larger of
    /// heating and cooling.
    pub fn hvac_va(&self) -> f64 {
        self.heating_va.max(self.cooling_va)
    }

    /// General lighting, small-appliance and laundry load before demand factors.
    pub fn general_va(&self) -> Option<f64> {
        self.floor_area_sqft
            .map(|sqft| LIGHTING_VA_PER_SQFT * sqft + SMALL_APPLIANCE_AND_LAUNDRY_VA)
    }

    /// Fastened-in-place appliances (NEC 220.53).
    pub fn fastened_appliances_va(&self) -> [f64; 4] {
        [
            self.water_heater_va,
            self.dishwasher_va,
            self.pool_heater_va,
            self.hot_tub_heater_va,
        ]
    }
}

fn system_kind(option: &str) -> &str {
    option.split(',').next().unwrap_or_default().trim()
}

fn capacity_w(record: &BuildingRecord, column: &str, default_kbtu_h: f64) -> f64 {
    record
        .number(column)
        .filter(|kbtu_h| *kbtu_h > 0.0)
        .unwrap_or(default_kbtu_h)
        * W_PER_KBTU_H
}

fn electric_va(record: &BuildingRecord, characteristic: &str, va: f64) -> f64 {
    match record.characteristic(characteristic) {
        Some(o) if o.starts_with("Electric") => va,
        _ => 0.0,
    }
}

/// Representative floor area for a bin label such as `"1500-1999"` or `"4000+"`.
pub fn floor_area_sqft(bin: &str) -> Option<f64> {
    let bin = bin.trim();
    if let Some((_, sqft)) = FLOOR_AREA_BINS.iter().find(|(label, _)| *label == bin) {
        return Some(*sqft);
    }
    if let Some(lower) = bin.strip_suffix('+') {
        return lower.trim().parse().ok();
    }
    if let Some((lo, hi)) = bin.split_once('-') {
        let lo: f64 = lo.trim().parse().ok()?;
        let hi: f64 = hi.trim().parse().ok()?;
        return Some((lo + hi) / 2.0);
    }
    bin.parse().ok()
}
