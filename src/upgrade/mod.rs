//! Upgrade scenarios: overlaying applied options and evaluating each
//! package against the baseline panel.

pub mod evaluator;
pub mod overlay;

pub use evaluator::{
    BuildingOutcome, PeakIncreaseOutcome, ReplacementOutcome, ScenarioOutcome, UpgradeEvaluator,
};
pub use overlay::{Overlay, overlay_upgrade};
