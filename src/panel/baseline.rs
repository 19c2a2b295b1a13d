//! Baseline panel amperage: all three estimates per building, and the one
//! chosen as the installed panel.

use std::collections::BTreeMap;

use tracing::info;

use super::estimate::{EstimationMethod, PeakSource, nec_panel_amp, peak_panel_amp};
use super::regression::{PanelModel, class_amp};
use crate::building::record::{BuildingRecord, ResultsTable};
use crate::nec::StandardMethodCalculator;

/// Every baseline estimate for one building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineAmperage {
    pub peak_amp: Option<f64>,
    pub nec_amp: Option<f64>,
    pub regression_amp: Option<f64>,
    /// The estimate selected as the building's installed panel rating.
    pub resolved_amp: Option<f64>,
}

/// Picks the installed panel rating among the three estimates.
///
/// Vacant homes always take the NEC estimate: their simulated peak and the
/// regression inputs do not reflect an occupied load.
pub fn resolve(
    method: EstimationMethod,
    vacant: bool,
    peak_amp: Option<f64>,
    nec_amp: Option<f64>,
    regression_amp: Option<f64>,
) -> Option<f64> {
    if vacant {
        return nec_amp;
    }
    match method {
        EstimationMethod::Peak => peak_amp,
        EstimationMethod::Nec => nec_amp,
        EstimationMethod::Regression => regression_amp,
    }
}

/// Runs the estimation methods and resolves the baseline panel rating.
pub struct BaselineResolver<'a> {
    method: EstimationMethod,
    peak_source: PeakSource,
    standard: &'a dyn StandardMethodCalculator,
    model: Option<&'a dyn PanelModel>,
}

impl<'a> BaselineResolver<'a> {
    /// Creates a resolver without a regression model; regression estimates
    /// are then unknown.
    pub fn new(
        method: EstimationMethod,
        peak_source: PeakSource,
        standard: &'a dyn StandardMethodCalculator,
    ) -> Self {
        Self {
            method,
            peak_source,
            standard,
            model: None,
        }
    }

    pub fn with_model(mut self, model: &'a dyn PanelModel) -> Self {
        self.model = Some(model);
        self
    }

    /// All estimates for one building.
    pub fn estimate(&self, record: &BuildingRecord) -> BaselineAmperage {
        let peak_amp = peak_panel_amp(self.peak_source.peak_kw(record));
        let nec_amp = nec_panel_amp(self.standard, record);
        let regression_amp = self
            .model
            .and_then(|model| class_amp(model.predict(record), peak_amp, nec_amp));

        BaselineAmperage {
            peak_amp,
            nec_amp,
            regression_amp,
            resolved_amp: resolve(
                self.method,
                record.is_vacant(),
                peak_amp,
                nec_amp,
                regression_amp,
            ),
        }
    }

    /// Estimates every building of the baseline table.
    pub fn estimate_table(&self, baseline: &ResultsTable) -> BTreeMap<u64, BaselineAmperage> {
        let estimates: BTreeMap<u64, BaselineAmperage> = baseline
            .iter()
            .map(|record| (record.building_id, self.estimate(record)))
            .collect();

        let unknown = estimates
            .values()
            .filter(|e| e.resolved_amp.is_none())
            .count();
        info!(
            method = %self.method,
            buildings = estimates.len(),
            unknown,
            "resolved baseline panel amperage"
        );
        estimates
    }
}
