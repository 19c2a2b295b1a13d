//! Baseline panel estimation methods and peak demand sources.

use std::fmt;
use std::str::FromStr;

use super::rounding::standard_panel_amp;
use crate::building::record::BuildingRecord;
use crate::config::ConfigError;
use crate::nec::{SERVICE_VOLTAGE, StandardMethodCalculator};

/// Simulated annual peak electricity demand (kW).
pub const QOI_PEAK_KW: &str = "qoi_report.qoi_peak_magnitude_use_kw";
/// Simulated winter peak electricity demand (W).
pub const WINTER_PEAK_W: &str = "report_simulation_output.peak_electricity_winter_total_w";
/// Simulated summer peak electricity demand (W).
pub const SUMMER_PEAK_W: &str = "report_simulation_output.peak_electricity_summer_total_w";

/// Empirical ratio of panel rating to metered peak current: peaks sit at
/// roughly a quarter of the panel rating.
pub const PEAK_TO_PANEL_RATIO: f64 = 4.0;

/// How the baseline panel amperage of a building is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimationMethod {
    /// Four times the simulated peak current.
    Peak,
    /// NEC standard method.
    Nec,
    /// Trained panel regression model.
    Regression,
}

impl FromStr for EstimationMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "peak" => Ok(Self::Peak),
            "nec" => Ok(Self::Nec),
            "regression" => Ok(Self::Regression),
            other => Err(ConfigError {
                field: "run.baseline_method".to_string(),
                message: format!(
                    "must be \"peak\", \"nec\" or \"regression\", got \"{other}\""
                ),
            }),
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Peak => "peak",
            Self::Nec => "nec",
            Self::Regression => "regression",
        })
    }
}

/// Where a building's peak electricity demand is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakSource {
    /// The QOI report's annual peak magnitude.
    #[default]
    Qoi,
    /// The larger of the reported winter and summer peaks.
    SeasonalMax,
}

impl FromStr for PeakSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qoi" => Ok(Self::Qoi),
            "seasonal_max" | "seasonal-max" => Ok(Self::SeasonalMax),
            other => Err(ConfigError {
                field: "run.peak_source".to_string(),
                message: format!("must be \"qoi\" or \"seasonal_max\", got \"{other}\""),
            }),
        }
    }
}

impl PeakSource {
    /// Peak electricity demand (kW) of `record`, `None` when not reported.
    pub fn peak_kw(self, record: &BuildingRecord) -> Option<f64> {
        match self {
            Self::Qoi => record.number(QOI_PEAK_KW),
            Self::SeasonalMax => {
                let winter = record.number(WINTER_PEAK_W);
                let summer = record.number(SUMMER_PEAK_W);
                let max_w = match (winter, summer) {
                    (Some(w), Some(s)) => Some(w.max(s)),
                    (w, s) => w.or(s),
                };
                max_w.map(|w| w / 1000.0)
            }
        }
    }
}

/// Peak-based panel estimate: the peak current, rounded up to whole amps,
/// times [`PEAK_TO_PANEL_RATIO`], snapped to a standard size.
///
/// # Examples
///
/// ```
/// use panel_upgrade::panel::estimate::peak_panel_amp;
///
/// // ceil(5000 / 240) = 21 A, x4 = 84 A
/// assert_eq!(peak_panel_amp(Some(5.0)), Some(100.0));
/// ```
pub fn peak_panel_amp(peak_kw: Option<f64>) -> Option<f64> {
    let amp = (peak_kw? * 1000.0 / SERVICE_VOLTAGE).ceil();
    standard_panel_amp(Some(amp * PEAK_TO_PANEL_RATIO))
}

/// NEC standard-method panel estimate, snapped to a standard size.
pub fn nec_panel_amp(
    calculator: &dyn StandardMethodCalculator,
    record: &BuildingRecord,
) -> Option<f64> {
    standard_panel_amp(calculator.min_amperage(record))
}
