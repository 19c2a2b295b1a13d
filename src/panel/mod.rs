//! Electrical panel amperage: standard sizes, estimation methods, and the
//! baseline resolver.

pub mod baseline;
pub mod estimate;
pub mod regression;
pub mod rounding;

pub use baseline::{BaselineAmperage, BaselineResolver};
pub use estimate::{EstimationMethod, PeakSource};
pub use regression::{LogisticPanelModel, PanelClass, PanelModel};
pub use rounding::standard_panel_amp;
