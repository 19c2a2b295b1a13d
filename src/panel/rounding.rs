//! Snapping a minimum amperage requirement onto a standard panel rating.

use tracing::warn;

/// Standard main-breaker ratings (A), ascending.
///
/// See <http://www.naffainc.com/x/CB2/Elect/EHtmFiles/StdPanelSizes.htm>.
pub const STANDARD_PANEL_SIZES_AMP: [f64; 10] =
    [50.0, 60.0, 70.0, 100.0, 125.0, 150.0, 200.0, 300.0, 400.0, 600.0];

/// Returns the smallest standard panel rating that covers `required_amp`.
///
/// Requirements above the largest standard rating are logged as a warning
/// and rounded up to the next multiple of 100 A. An unknown requirement
/// stays unknown.
///
/// # Examples
///
/// ```
/// use panel_upgrade::panel::rounding::standard_panel_amp;
///
/// assert_eq!(standard_panel_amp(Some(84.0)), Some(100.0));
/// assert_eq!(standard_panel_amp(Some(610.0)), Some(700.0));
/// assert_eq!(standard_panel_amp(None), None);
/// ```
pub fn standard_panel_amp(required_amp: Option<f64>) -> Option<f64> {
    let required = required_amp.filter(|x| !x.is_nan())?;
    if let Some(size) = STANDARD_PANEL_SIZES_AMP
        .iter()
        .copied()
        .find(|&size| size >= required)
    {
        return Some(size);
    }

    let largest = STANDARD_PANEL_SIZES_AMP[STANDARD_PANEL_SIZES_AMP.len() - 1];
    warn!(
        required_amp = required,
        largest_standard_amp = largest,
        "requirement exceeds the largest standard panel size, double-check NEC calculations"
    );
    Some((required / 100.0).ceil() * 100.0)
}
