//! Shared fixtures: a small community of buildings written as results tables.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use panel_upgrade::config::PanelConfig;
use panel_upgrade::io::table_path;

pub const COMMUNITY: &str = "testville";

/// Baseline: a gas home, an all-electric home, a vacant gas home with a zero
/// peak, and a failed simulation.
pub const BASELINE: &str = "\
building_id,completed_status,sample_weight,build_existing_model.geometry_floor_area,\
build_existing_model.heating_fuel,build_existing_model.hvac_heating_efficiency,\
build_existing_model.hvac_cooling_efficiency,build_existing_model.water_heater_efficiency,\
build_existing_model.clothes_dryer,build_existing_model.cooking_range,\
build_existing_model.vacancy_status,qoi_report.qoi_peak_magnitude_use_kw
1,Success,100,1500-1999,Natural Gas,\"Fuel Furnace, 80% AFUE\",\"AC, SEER 13\",Natural Gas Standard,\"Gas, 100% Usage\",\"Gas, 100% Usage\",Occupied,4.0
2,Success,100,1000-1499,Electricity,\"Electric Baseboard, 100% Efficiency\",None,Electric Standard,\"Electric, 100% Usage\",\"Electric, 100% Usage\",Occupied,10.0
3,Success,100,1500-1999,Natural Gas,\"Fuel Furnace, 80% AFUE\",\"AC, SEER 13\",Natural Gas Standard,\"Gas, 100% Usage\",\"Gas, 100% Usage\",Vacant,0
4,Fail,100,1500-1999,Natural Gas,\"Fuel Furnace, 80% AFUE\",\"AC, SEER 13\",Natural Gas Standard,\"Gas, 100% Usage\",\"Gas, 100% Usage\",Occupied,
";

/// Upgrade 1: air-source heat pump for every home. Building 5 has no baseline row.
pub const HEAT_PUMP: &str = "\
building_id,completed_status,sample_weight,apply_upgrade.upgrade_name,\
upgrade_costs.option_01_name,upgrade_costs.option_02_name,qoi_report.qoi_peak_magnitude_use_kw
1,Success,100,Heat pump,\"HVAC Heating Efficiency|ASHP, SEER 15, 8.5 HSPF\",,8.0
2,Success,100,Heat pump,\"HVAC Heating Efficiency|ASHP, SEER 15, 8.5 HSPF\",,9.0
3,Success,100,Heat pump,\"HVAC Heating Efficiency|ASHP, SEER 15, 8.5 HSPF\",,2.0
5,Success,100,Heat pump,\"HVAC Heating Efficiency|ASHP, SEER 15, 8.5 HSPF\",,3.0
";

/// Upgrade 2: air sealing only; building 3 failed.
pub const ENVELOPE: &str = "\
building_id,completed_status,sample_weight,apply_upgrade.upgrade_name,\
upgrade_costs.option_01_name,upgrade_costs.option_02_name,qoi_report.qoi_peak_magnitude_use_kw
1,Success,100,Envelope,Infiltration Reduction|30%,,4.0
2,Success,100,Envelope,Infiltration Reduction|30%,,10.0
3,Fail,100,Envelope,Infiltration Reduction|30%,,
";

/// An upgrade whose option names a parameter absent from the baseline.
pub const UNKNOWN_PARAMETER: &str = "\
building_id,completed_status,sample_weight,upgrade_costs.option_01_name,qoi_report.qoi_peak_magnitude_use_kw
1,Success,100,Insulation Wall|R-13,4.0
";

/// Writes `tables` as `up00`, `up01`, ... under `<data_dir>/<COMMUNITY>` and
/// returns the community directory.
pub fn write_community(data_dir: &Path, tables: &[&str]) -> PathBuf {
    let dir = data_dir.join(COMMUNITY);
    fs::create_dir_all(&dir).expect("create community dir");
    for (index, table) in tables.iter().enumerate() {
        fs::write(table_path(&dir, COMMUNITY, index), table).expect("write table");
    }
    dir
}

/// Configuration for [`COMMUNITY`] under `data_dir`.
pub fn config(data_dir: &Path, method: &str, upgrades: usize) -> PanelConfig {
    let mut config = PanelConfig::default();
    config.run.data_dir = data_dir.to_path_buf();
    config.run.community = COMMUNITY.to_string();
    config.run.baseline_method = method.to_string();
    config.run.upgrades = upgrades;
    config
}

/// Reads a report CSV into rows of cells, header included.
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open report");
    rdr.records()
        .map(|r| r.expect("report row").iter().map(str::to_string).collect())
        .collect()
}

/// Parses a fraction cell; empty cells are `None`.
pub fn fraction(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.parse().expect("numeric cell"))
    }
}
