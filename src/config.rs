//! TOML-based run configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::panel::estimate::{EstimationMethod, PeakSource};

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`PanelConfig::from_toml_file`] or start from [`PanelConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    /// Community, data location and baseline estimation choices.
    #[serde(default)]
    pub run: RunConfig,
    /// Peak-increase thresholds reported per upgrade.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Nameplate ratings used by the built-in NEC calculator.
    #[serde(default)]
    pub nameplate: NameplateConfig,
}

/// Community, data location and baseline estimation choices.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Community name; also the sub-directory and file suffix of its tables.
    pub community: String,
    /// Directory holding one sub-directory per community.
    pub data_dir: PathBuf,
    /// Baseline panel estimation: `"peak"`, `"nec"` or `"regression"`.
    pub baseline_method: String,
    /// Peak demand source: `"qoi"` or `"seasonal_max"`.
    pub peak_source: String,
    /// Number of upgrade tables, read as `up01` through `upNN`.
    pub upgrades: usize,
    /// Panel regression model (JSON). Required for the regression method.
    pub model_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            community: "san_jose".to_string(),
            data_dir: PathBuf::from("data_/community_building_samples_with_upgrade_cost_and_bill"),
            baseline_method: "regression".to_string(),
            peak_source: "qoi".to_string(),
            upgrades: 10,
            model_path: Some(PathBuf::from("config/prelim_panel_model.json")),
        }
    }
}

/// Peak-increase thresholds reported per upgrade.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Minimum peak increase (%) for each reported column.
    pub peak_increase_pct: Vec<f64>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            peak_increase_pct: vec![25.0, 50.0, 75.0, 100.0, 125.0, 150.0],
        }
    }
}

/// Nameplate ratings (VA) and sizing defaults for the built-in NEC calculator.
///
/// Capacities are only used when the results table carries no
/// `upgrade_costs.size_*` column for the building.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NameplateConfig {
    /// Primary heating capacity when not reported (kBtu/h).
    pub heating_capacity_kbtu_h: f64,
    /// Heat pump backup capacity when not reported (kBtu/h).
    pub heat_pump_backup_kbtu_h: f64,
    /// Cooling capacity when not reported (kBtu/h).
    pub cooling_capacity_kbtu_h: f64,
    /// Heat pump compressor COP used to turn capacity into VA.
    pub heat_pump_cop: f64,
    /// Air conditioner COP used to turn capacity into VA.
    pub cooling_cop: f64,
    pub water_heater_resistance_va: f64,
    pub water_heater_heat_pump_va: f64,
    pub water_heater_tankless_va: f64,
    pub clothes_dryer_va: f64,
    pub range_va: f64,
    pub dishwasher_va: f64,
    pub pool_heater_va: f64,
    pub hot_tub_heater_va: f64,
    pub ev_charger_va: f64,
}

impl Default for NameplateConfig {
    fn default() -> Self {
        Self {
            heating_capacity_kbtu_h: 36.0,
            heat_pump_backup_kbtu_h: 34.1,
            cooling_capacity_kbtu_h: 36.0,
            heat_pump_cop: 2.5,
            cooling_cop: 3.0,
            water_heater_resistance_va: 5500.0,
            water_heater_heat_pump_va: 4500.0,
            water_heater_tankless_va: 24000.0,
            clothes_dryer_va: 5760.0,
            range_va: 12000.0,
            dishwasher_va: 1200.0,
            pool_heater_va: 27000.0,
            hot_tub_heater_va: 11000.0,
            ev_charger_va: 7680.0,
        }
    }
}

impl NameplateConfig {
    fn ratings(&self) -> [(&'static str, f64); 14] {
        [
            ("heating_capacity_kbtu_h", self.heating_capacity_kbtu_h),
            ("heat_pump_backup_kbtu_h", self.heat_pump_backup_kbtu_h),
            ("cooling_capacity_kbtu_h", self.cooling_capacity_kbtu_h),
            ("heat_pump_cop", self.heat_pump_cop),
            ("cooling_cop", self.cooling_cop),
            ("water_heater_resistance_va", self.water_heater_resistance_va),
            ("water_heater_heat_pump_va", self.water_heater_heat_pump_va),
            ("water_heater_tankless_va", self.water_heater_tankless_va),
            ("clothes_dryer_va", self.clothes_dryer_va),
            ("range_va", self.range_va),
            ("dishwasher_va", self.dishwasher_va),
            ("pool_heater_va", self.pool_heater_va),
            ("hot_tub_heater_va", self.hot_tub_heater_va),
            ("ev_charger_va", self.ev_charger_va),
        ]
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"run.baseline_method"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl PanelConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// The configured baseline estimation method.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` unless `run.baseline_method` is `peak`, `nec`
    /// or `regression`.
    pub fn baseline_method(&self) -> Result<EstimationMethod, ConfigError> {
        self.run.baseline_method.parse()
    }

    /// The configured peak demand source.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` unless `run.peak_source` is `qoi` or `seasonal_max`.
    pub fn peak_source(&self) -> Result<PeakSource, ConfigError> {
        self.run.peak_source.parse()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let r = &self.run;

        if r.community.trim().is_empty() {
            errors.push(ConfigError {
                field: "run.community".into(),
                message: "must not be empty".into(),
            });
        }
        match self.baseline_method() {
            Ok(EstimationMethod::Regression) if r.model_path.is_none() => {
                errors.push(ConfigError {
                    field: "run.model_path".into(),
                    message: "required when run.baseline_method is \"regression\"".into(),
                });
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
        if let Err(e) = self.peak_source() {
            errors.push(e);
        }
        if r.upgrades == 0 {
            errors.push(ConfigError {
                field: "run.upgrades".into(),
                message: "must be > 0".into(),
            });
        }

        let t = &self.thresholds.peak_increase_pct;
        if t.is_empty() {
            errors.push(ConfigError {
                field: "thresholds.peak_increase_pct".into(),
                message: "must list at least one threshold".into(),
            });
        }
        if t.iter().any(|x| !x.is_finite()) {
            errors.push(ConfigError {
                field: "thresholds.peak_increase_pct".into(),
                message: "thresholds must be finite".into(),
            });
        }

        for (name, value) in self.nameplate.ratings() {
            let positive = value > 0.0 && value.is_finite();
            let backup_may_be_zero = name == "heat_pump_backup_kbtu_h" && value == 0.0;
            if !positive && !backup_may_be_zero {
                errors.push(ConfigError {
                    field: format!("nameplate.{name}"),
                    message: "must be > 0".into(),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let cfg = PanelConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let cfg = PanelConfig::from_toml_str(include_str!("../config/panel_upgrade.toml"))
            .expect("bundled config should parse");
        assert!(cfg.validate().is_empty());
        let defaults = PanelConfig::default();
        assert_eq!(cfg.run.model_path, defaults.run.model_path);
        assert_eq!(cfg.thresholds.peak_increase_pct, defaults.thresholds.peak_increase_pct);
        assert_eq!(cfg.nameplate.range_va, defaults.nameplate.range_va);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[run]
community = "fresno"
data_dir = "data"
baseline_method = "peak"
peak_source = "seasonal_max"
upgrades = 3

[thresholds]
peak_increase_pct = [10.0, 20.0]

[nameplate]
range_va = 9000.0
ev_charger_va = 11520.0
"#;
        let cfg = PanelConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| &*c.run.community), Some("fresno"));
        assert_eq!(cfg.as_ref().map(|c| c.run.upgrades), Some(3));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.baseline_method().ok()),
            Some(EstimationMethod::Peak)
        );
        assert_eq!(
            cfg.as_ref().and_then(|c| c.peak_source().ok()),
            Some(PeakSource::SeasonalMax)
        );
        assert_eq!(cfg.as_ref().map(|c| c.nameplate.range_va), Some(9000.0));
        // untouched nameplate keeps default
        assert_eq!(cfg.as_ref().map(|c| c.nameplate.dishwasher_va), Some(1200.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[run]
community = "fresno"
bogus_field = true
"#;
        assert!(PanelConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_unknown_method() {
        let mut cfg = PanelConfig::default();
        cfg.run.baseline_method = "median".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.baseline_method"));
        assert!(cfg.baseline_method().is_err());
    }

    #[test]
    fn validation_requires_model_for_regression() {
        let mut cfg = PanelConfig::default();
        cfg.run.model_path = None;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.model_path"));

        cfg.run.baseline_method = "nec".to_string();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_bad_peak_source() {
        let mut cfg = PanelConfig::default();
        cfg.run.peak_source = "hourly".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.peak_source"));
    }

    #[test]
    fn validation_catches_zero_upgrades_and_empty_thresholds() {
        let mut cfg = PanelConfig::default();
        cfg.run.upgrades = 0;
        cfg.thresholds.peak_increase_pct.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.upgrades"));
        assert!(errors.iter().any(|e| e.field == "thresholds.peak_increase_pct"));
    }

    #[test]
    fn validation_catches_non_positive_nameplate() {
        let mut cfg = PanelConfig::default();
        cfg.nameplate.range_va = 0.0;
        cfg.nameplate.heat_pump_backup_kbtu_h = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "nameplate.range_va"));
        assert!(!errors.iter().any(|e| e.field == "nameplate.heat_pump_backup_kbtu_h"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[run]
baseline_method = "nec"
"#;
        let cfg = PanelConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.run.upgrades), Some(10));
        assert_eq!(
            cfg.as_ref().map(|c| c.thresholds.peak_increase_pct.len()),
            Some(6)
        );
    }
}
