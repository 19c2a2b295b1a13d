//! Applying an upgrade row's options onto its baseline characteristics.

use crate::building::parameter::{Parameter, parse_option};
use crate::building::record::BuildingRecord;
use crate::error::{PanelError, Result};

/// The upgraded view of one building.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Upgrade row values with the baseline characteristics updated by every
    /// applied option.
    pub upgraded: BuildingRecord,
    /// Whether an applied option introduces a new electric heating or
    /// cooling load.
    pub new_hvac: bool,
}

/// Overlays the options applied in `upgrade` onto `baseline`.
///
/// Options are applied in column order, so a later option on the same
/// parameter wins. `Infiltration Reduction` is not a sampled characteristic
/// and is skipped.
///
/// # Errors
///
/// Returns `PanelError::DataIntegrity` when an option names a parameter the
/// baseline characteristics do not carry.
pub fn overlay_upgrade(baseline: &BuildingRecord, upgrade: &BuildingRecord) -> Result<Overlay> {
    let mut characteristics = baseline.characteristics.clone();
    let mut new_hvac = false;

    for (column, cell) in upgrade.option_names() {
        let Some(option) = parse_option(cell) else {
            continue;
        };
        new_hvac |= option.adds_electric_hvac(baseline);

        // TODO: map infiltration reduction onto `infiltration` once its
        // percentage options can be resolved to an ACH50 level.
        if option.parameter == Parameter::InfiltrationReduction {
            continue;
        }

        let name = option.parameter.name();
        if !baseline.has_characteristic(name) {
            return Err(PanelError::DataIntegrity {
                parameter: name.to_string(),
                column: column.to_string(),
                building_id: baseline.building_id,
            });
        }
        characteristics.insert(name.to_string(), option.option);
    }

    Ok(Overlay {
        upgraded: BuildingRecord {
            building_id: baseline.building_id,
            characteristics,
            values: upgrade.values.clone(),
        },
        new_hvac,
    })
}
