//! Upgrade option strings (`"Parameter|Option"`) and the rules that decide
//! whether an applied option adds a new electric space-conditioning load.

use super::record::BuildingRecord;

const ELECTRICITY: &str = "Electricity";
const NO_EQUIPMENT: &str = "None";

/// Heating system kinds (text before the first comma of a heating
/// efficiency option) that run on electricity.
pub const ELECTRIC_HEATING_SYSTEMS: &[&str] = &[
    "ASHP",
    "MSHP",
    "GSHP",
    "Electric Baseboard",
    "Electric Boiler",
    "Electric Furnace",
    "Electric Wall Furnace",
];

/// Normalizes a housing parameter label into its characteristic column name.
///
/// Lower-cases, splits on spaces, separates digit runs into their own
/// tokens, drops empty and `-` tokens, and joins with underscores:
/// `"HVAC Heating Efficiency"` becomes `hvac_heating_efficiency`,
/// `"Insulation Wall 2x4"` becomes `insulation_wall_2_x_4`.
pub fn normalize_parameter_name(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut tokens = Vec::new();
    for word in lower.split(' ') {
        let mut current = String::new();
        let mut in_digits = false;
        for c in word.chars() {
            let digit = c.is_ascii_digit();
            if digit != in_digits && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            in_digits = digit;
            current.push(c);
        }
        tokens.push(current);
    }
    tokens.retain(|t| !t.is_empty() && t != "-");
    tokens.join("_")
}

/// Canonical housing parameters the electrification rules care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    HvacHeatingEfficiency,
    HvacCoolingEfficiency,
    HvacSharedEfficiencies,
    /// Not a sampled characteristic; skipped when overlaying options.
    InfiltrationReduction,
    Other(String),
}

impl Parameter {
    /// Maps a raw label (e.g. `"HVAC Heating Efficiency"`) to a parameter.
    ///
    /// Labels without the `HVAC` prefix are accepted as aliases.
    pub fn from_label(label: &str) -> Self {
        let name = normalize_parameter_name(label);
        match name.as_str() {
            "hvac_heating_efficiency" | "heating_efficiency" => Self::HvacHeatingEfficiency,
            "hvac_cooling_efficiency" | "cooling_efficiency" => Self::HvacCoolingEfficiency,
            "hvac_shared_efficiencies" | "shared_efficiencies" => Self::HvacSharedEfficiencies,
            "infiltration_reduction" => Self::InfiltrationReduction,
            _ => Self::Other(name),
        }
    }

    /// Characteristic column name (without the `build_existing_model.` prefix).
    pub fn name(&self) -> &str {
        match self {
            Self::HvacHeatingEfficiency => "hvac_heating_efficiency",
            Self::HvacCoolingEfficiency => "hvac_cooling_efficiency",
            Self::HvacSharedEfficiencies => "hvac_shared_efficiencies",
            Self::InfiltrationReduction => "infiltration_reduction",
            Self::Other(name) => name,
        }
    }
}

/// One applied upgrade option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOption {
    pub parameter: Parameter,
    pub option: String,
}

/// Parses `"Parameter|Option"`; cells without a `|` are not applied options.
pub fn parse_option(cell: &str) -> Option<UpgradeOption> {
    let (label, option) = cell.split_once('|')?;
    Some(UpgradeOption {
        parameter: Parameter::from_label(label),
        option: option.to_string(),
    })
}

/// Whether a heating efficiency option installs an electric heating system.
pub fn is_electric_heating_option(option: &str) -> bool {
    let system = option.split(',').next().unwrap_or_default().trim();
    ELECTRIC_HEATING_SYSTEMS.contains(&system)
}

/// Whether a shared-system efficiency option switches to electricity.
pub fn is_electric_shared_option(option: &str) -> bool {
    option.split(',').any(|segment| segment.trim() == ELECTRICITY)
}

impl UpgradeOption {
    /// Whether applying this option to `baseline` introduces a new electric
    /// heating or cooling load.
    pub fn adds_electric_hvac(&self, baseline: &BuildingRecord) -> bool {
        let heated_electrically = baseline.characteristic("heating_fuel") == Some(ELECTRICITY);
        match self.parameter {
            Parameter::HvacHeatingEfficiency => {
                is_electric_heating_option(&self.option) && !heated_electrically
            }
            Parameter::HvacSharedEfficiencies => {
                is_electric_shared_option(&self.option) && !heated_electrically
            }
            Parameter::HvacCoolingEfficiency => {
                self.option != NO_EQUIPMENT
                    && baseline.characteristic(self.parameter.name()) == Some(NO_EQUIPMENT)
            }
            Parameter::InfiltrationReduction | Parameter::Other(_) => false,
        }
    }
}
