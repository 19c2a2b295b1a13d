//! Per-upgrade evaluation: peak increase and panel replacement likelihood.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::overlay::overlay_upgrade;
use crate::building::record::{BuildingRecord, ResultsTable};
use crate::error::Result;
use crate::nec::load_study::projected_amp;
use crate::nec::{LoadStudyCalculator, NewLoadCalculator};
use crate::panel::baseline::BaselineAmperage;
use crate::panel::estimate::PeakSource;

/// Outcome of one building under one upgrade.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingOutcome {
    pub building_id: u64,
    /// Sample weight of the upgrade row; missing weights count as zero.
    pub weight: f64,
    /// `(upgraded - baseline) / baseline * 100`; `None` when the baseline
    /// peak is zero or either peak is missing.
    pub peak_increase_pct: Option<f64>,
    pub new_hvac: bool,
    /// 220.83 demand increase (VA), floored at zero.
    pub new_load_delta_va: Option<f64>,
    /// 220.83 minimum amperage of the upgraded building.
    pub new_load_amp: Option<f64>,
    /// 220.87 load added by the upgrade (VA).
    pub load_study_va: f64,
    /// 220.87 projected service amperage.
    pub load_study_amp: Option<f64>,
    pub replace_220_83: bool,
    pub replace_load_study: bool,
}

/// Weighted fractions of the population whose peak rises by at least each
/// threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakIncreaseOutcome {
    /// Weight of the buildings with a defined peak increase; the denominator
    /// of every threshold fraction.
    pub n_applicable: f64,
    /// `(threshold %, fraction)` in threshold order.
    pub fractions: Vec<(f64, Option<f64>)>,
}

/// Weighted fractions of the population likely to need a panel replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementOutcome {
    /// Weight of every aligned building; the denominator of both methods.
    pub n_applicable: f64,
    pub new_load_220_83: Option<f64>,
    pub load_study: Option<f64>,
}

impl ReplacementOutcome {
    /// Mean of the known method fractions.
    pub fn average(&self) -> Option<f64> {
        let known: Vec<f64> = [self.new_load_220_83, self.load_study]
            .into_iter()
            .flatten()
            .collect();
        if known.is_empty() {
            None
        } else {
            Some(known.iter().sum::<f64>() / known.len() as f64)
        }
    }
}

/// Everything reported for one upgrade package.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub upgrade_name: String,
    pub peak_increase: PeakIncreaseOutcome,
    pub replacement: ReplacementOutcome,
}

fn weighted_fraction(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

/// Sum of weights. Starts from `+0.0` so that an empty set reports `0`,
/// not `-0`.
fn total_weight<'o>(outcomes: impl Iterator<Item = &'o BuildingOutcome>) -> f64 {
    outcomes.fold(0.0, |total, o| total + o.weight)
}

fn at_least(value: Option<f64>, threshold: Option<f64>) -> bool {
    matches!((value, threshold), (Some(v), Some(t)) if v >= t)
}

/// Evaluates upgrade tables against the baseline.
///
/// Holds no state between upgrades; each call reads only the baseline and
/// one upgrade table.
pub struct UpgradeEvaluator<'a> {
    new_load: &'a dyn NewLoadCalculator,
    load_study: &'a dyn LoadStudyCalculator,
    peak_source: PeakSource,
    thresholds_pct: &'a [f64],
}

impl<'a> UpgradeEvaluator<'a> {
    pub fn new(
        new_load: &'a dyn NewLoadCalculator,
        load_study: &'a dyn LoadStudyCalculator,
        peak_source: PeakSource,
        thresholds_pct: &'a [f64],
    ) -> Self {
        Self {
            new_load,
            load_study,
            peak_source,
            thresholds_pct,
        }
    }

    /// Evaluates one building.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::DataIntegrity` if an applied option names an
    /// unknown parameter.
    pub fn evaluate_building(
        &self,
        baseline: &BuildingRecord,
        upgrade: &BuildingRecord,
        baseline_panel_amp: Option<f64>,
    ) -> Result<BuildingOutcome> {
        let overlay = overlay_upgrade(baseline, upgrade)?;

        let baseline_peak_kw = self.peak_source.peak_kw(baseline);
        let upgrade_peak_kw = self.peak_source.peak_kw(upgrade);
        let peak_increase_pct = match (baseline_peak_kw, upgrade_peak_kw) {
            (Some(before), Some(after)) if before != 0.0 => Some((after - before) / before * 100.0),
            _ => None,
        };

        let before = self.new_load.demand_load(baseline, overlay.new_hvac);
        let after = self.new_load.demand_load(&overlay.upgraded, overlay.new_hvac);
        let new_load_delta_va = before
            .zip(after)
            .map(|(b, a)| (a.total_va - b.total_va).max(0.0));
        let new_load_amp = after.map(|a| a.min_amp);
        let replace_220_83 = new_load_delta_va.is_some_and(|d| d > 0.0)
            && at_least(new_load_amp, baseline_panel_amp);

        let load_study_va = self
            .load_study
            .new_load_va(baseline, &overlay.upgraded, overlay.new_hvac);
        let load_study_amp = baseline_peak_kw.map(|kw| projected_amp(kw, load_study_va));
        let replace_load_study =
            load_study_va > 0.0 && at_least(load_study_amp, baseline_panel_amp);

        Ok(BuildingOutcome {
            building_id: baseline.building_id,
            weight: upgrade.sample_weight().filter(|w| *w > 0.0).unwrap_or(0.0),
            peak_increase_pct,
            new_hvac: overlay.new_hvac,
            new_load_delta_va,
            new_load_amp,
            load_study_va,
            load_study_amp,
            replace_220_83,
            replace_load_study,
        })
    }

    /// Evaluates upgrade number `index` and tabulates its weighted fractions.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::DataIntegrity` if an applied option names an
    /// unknown parameter.
    pub fn evaluate(
        &self,
        index: usize,
        baseline: &ResultsTable,
        baseline_amps: &BTreeMap<u64, BaselineAmperage>,
        upgrade: &ResultsTable,
    ) -> Result<ScenarioOutcome> {
        let aligned = baseline.aligned(upgrade);
        let upgrade_name = aligned
            .iter()
            .find_map(|(_, up)| up.upgrade_name())
            .map_or_else(|| format!("upgrade {index:02}"), str::to_string);

        let outcomes = aligned
            .iter()
            .map(|(base, up)| {
                let panel_amp = baseline_amps
                    .get(&base.building_id)
                    .and_then(|a| a.resolved_amp);
                self.evaluate_building(base, up, panel_amp)
            })
            .collect::<Result<Vec<_>>>()?;

        let outcome = tabulate(upgrade_name, &outcomes, self.thresholds_pct);

        let undefined = outcomes
            .iter()
            .filter(|o| o.peak_increase_pct.is_none())
            .count();
        if undefined > 0 {
            warn!(
                upgrade = %outcome.upgrade_name,
                buildings = undefined,
                "peak increase undefined (zero or missing baseline peak), excluded from thresholds"
            );
        }
        debug!(
            upgrade = %outcome.upgrade_name,
            new_hvac = outcomes.iter().filter(|o| o.new_hvac).count(),
            "newly electrified space conditioning"
        );
        info!(
            upgrade = %outcome.upgrade_name,
            index,
            buildings = outcomes.len(),
            dropped = upgrade.len() - outcomes.len(),
            n_applicable = outcome.replacement.n_applicable,
            "evaluated upgrade"
        );
        Ok(outcome)
    }
}

/// Weighted fractions over a set of building outcomes.
pub fn tabulate(
    upgrade_name: String,
    outcomes: &[BuildingOutcome],
    thresholds_pct: &[f64],
) -> ScenarioOutcome {
    let n_all = total_weight(outcomes.iter());
    let n_defined = total_weight(outcomes.iter().filter(|o| o.peak_increase_pct.is_some()));

    let fractions = thresholds_pct
        .iter()
        .map(|&threshold| {
            let above = total_weight(
                outcomes
                    .iter()
                    .filter(|o| at_least(o.peak_increase_pct, Some(threshold))),
            );
            (threshold, weighted_fraction(above, n_defined))
        })
        .collect();

    let replaced = |pick: fn(&BuildingOutcome) -> bool| -> f64 {
        total_weight(outcomes.iter().filter(|o| pick(o)))
    };

    ScenarioOutcome {
        upgrade_name,
        peak_increase: PeakIncreaseOutcome {
            n_applicable: n_defined,
            fractions,
        },
        replacement: ReplacementOutcome {
            n_applicable: n_all,
            new_load_220_83: weighted_fraction(replaced(|o| o.replace_220_83), n_all),
            load_study: weighted_fraction(replaced(|o| o.replace_load_study), n_all),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::{NecCalculator, NewLoadDemand};
    use crate::panel::estimate::QOI_PEAK_KW;
    use approx::assert_relative_eq;

    /// 220.83 double: demand is the `demand_va` column, new HVAC adds 10 kVA.
    struct ColumnDemand;

    impl NewLoadCalculator for ColumnDemand {
        fn demand_load(&self, record: &BuildingRecord, new_hvac: bool) -> Option<NewLoadDemand> {
            let base = record.number("demand_va")?;
            Some(NewLoadDemand::from_va(base + if new_hvac { 10_000.0 } else { 0.0 }))
        }
    }

    /// 220.87 double: the `study_va` column of the upgraded record.
    struct ColumnStudy;

    impl LoadStudyCalculator for ColumnStudy {
        fn new_load_va(
            &self,
            _baseline: &BuildingRecord,
            upgraded: &BuildingRecord,
            _new_hvac: bool,
        ) -> f64 {
            upgraded.number("study_va").unwrap_or(0.0)
        }
    }

    fn outcome(weight: f64, pct: Option<f64>, r83: bool, rls: bool) -> BuildingOutcome {
        BuildingOutcome {
            building_id: 0,
            weight,
            peak_increase_pct: pct,
            new_hvac: false,
            new_load_delta_va: Some(0.0),
            new_load_amp: None,
            load_study_va: 0.0,
            load_study_amp: None,
            replace_220_83: r83,
            replace_load_study: rls,
        }
    }

    #[test]
    fn tabulate_excludes_undefined_peaks_from_thresholds_only() {
        let outcomes = vec![
            outcome(10.0, Some(30.0), true, false),
            outcome(30.0, Some(120.0), false, true),
            outcome(60.0, None, true, true),
        ];
        let s = tabulate("Heat pump".into(), &outcomes, &[25.0, 100.0, 150.0]);
        assert_eq!(s.peak_increase.n_applicable, 40.0);
        assert_eq!(
            s.peak_increase.fractions,
            vec![(25.0, Some(1.0)), (100.0, Some(0.75)), (150.0, Some(0.0))]
        );
        assert_eq!(s.replacement.n_applicable, 100.0);
        assert_relative_eq!(s.replacement.new_load_220_83.unwrap_or(0.0), 0.7);
        assert_relative_eq!(s.replacement.load_study.unwrap_or(0.0), 0.9);
        assert_relative_eq!(s.replacement.average().unwrap_or(0.0), 0.8);
    }

    #[test]
    fn unreached_threshold_is_positive_zero() {
        let outcomes = vec![outcome(5.0, Some(10.0), false, false)];
        let s = tabulate("Lighting".into(), &outcomes, &[25.0]);
        let fraction = s.peak_increase.fractions[0].1.unwrap_or(f64::NAN);
        assert_eq!(fraction, 0.0);
        assert!(fraction.is_sign_positive());
        let replaced = s.replacement.new_load_220_83.unwrap_or(f64::NAN);
        assert!(replaced == 0.0 && replaced.is_sign_positive());
        assert_eq!(format!("{fraction}"), "0");
    }

    #[test]
    fn tabulate_empty_population_is_unknown() {
        let s = tabulate("Nothing".into(), &[], &[25.0]);
        assert_eq!(s.peak_increase.fractions, vec![(25.0, None)]);
        assert_eq!(s.replacement.new_load_220_83, None);
        assert_eq!(s.replacement.average(), None);
    }

    fn pair(base_peak: &str, up_peak: &str) -> (BuildingRecord, BuildingRecord) {
        let base = BuildingRecord::new(1)
            .with_characteristic("heating_fuel", "Natural Gas")
            .with_characteristic("hvac_heating_efficiency", "Fuel Furnace, 80% AFUE")
            .with_value(QOI_PEAK_KW, base_peak)
            .with_value("demand_va", 20_000);
        let up = BuildingRecord::new(1)
            .with_value(QOI_PEAK_KW, up_peak)
            .with_value("demand_va", 20_000)
            .with_value("study_va", 12_000)
            .with_value("sample_weight", 2.5)
            .with_value(
                "upgrade_costs.option_01_name",
                "HVAC Heating Efficiency|ASHP, SEER 15, 8.5 HSPF",
            );
        (base, up)
    }

    #[test]
    fn zero_baseline_peak_is_undefined() {
        let eval = UpgradeEvaluator::new(&ColumnDemand, &ColumnStudy, PeakSource::Qoi, &[25.0]);
        let (base, up) = pair("0", "4");
        let o = eval.evaluate_building(&base, &up, Some(100.0)).expect("should evaluate");
        assert_eq!(o.peak_increase_pct, None);
        assert_eq!(o.load_study_amp, Some(50.0));
    }

    #[test]
    fn same_new_hvac_flag_on_both_sides_cancels_in_delta() {
        let eval = UpgradeEvaluator::new(&ColumnDemand, &ColumnStudy, PeakSource::Qoi, &[25.0]);
        let (base, up) = pair("4", "6");
        let o = eval.evaluate_building(&base, &up, Some(100.0)).expect("should evaluate");
        assert!(o.new_hvac);
        assert_relative_eq!(o.peak_increase_pct.unwrap_or(0.0), 50.0);
        assert_eq!(o.new_load_delta_va, Some(0.0));
        assert!(!o.replace_220_83);
        // (4000 * 1.25 + 12000) / 240 = 70.8 A
        assert!(!o.replace_load_study);
        let small_panel = eval.evaluate_building(&base, &up, Some(60.0)).expect("should evaluate");
        assert!(small_panel.replace_load_study);
        assert_eq!(small_panel.weight, 2.5);
    }

    #[test]
    fn delta_never_negative_with_nec_calculator() {
        let nec = NecCalculator::default();
        let eval = UpgradeEvaluator::new(&nec, &nec, PeakSource::Qoi, &[25.0]);
        let base = BuildingRecord::new(1)
            .with_characteristic("geometry_floor_area", "1000-1499")
            .with_characteristic("heating_fuel", "Natural Gas")
            .with_characteristic("hvac_heating_efficiency", "Fuel Furnace, 80% AFUE")
            .with_characteristic("hvac_cooling_efficiency", "None")
            .with_characteristic("cooking_range", "Electric, 100% Usage")
            .with_value(QOI_PEAK_KW, "9");
        let up = BuildingRecord::new(1)
            .with_value(QOI_PEAK_KW, "6")
            .with_value("upgrade_costs.option_01_name", "Cooking Range|Gas, 100% Usage");
        let o = eval.evaluate_building(&base, &up, Some(100.0)).expect("should evaluate");
        assert!(!o.new_hvac);
        assert_eq!(o.load_study_va, 0.0);
        assert_eq!(o.new_load_delta_va, Some(0.0));
        assert!(!o.replace_220_83);
        assert_eq!(o.weight, 0.0);
    }

    #[test]
    fn already_electric_heating_adds_no_load_study_load() {
        let nec = NecCalculator::default();
        let eval = UpgradeEvaluator::new(&nec, &nec, PeakSource::Qoi, &[25.0]);
        let base = BuildingRecord::new(1)
            .with_characteristic("geometry_floor_area", "1000-1499")
            .with_characteristic("heating_fuel", "Electricity")
            .with_characteristic("hvac_heating_efficiency", "Electric Baseboard, 100% Efficiency")
            .with_characteristic("hvac_cooling_efficiency", "None")
            .with_value(QOI_PEAK_KW, "9");
        let up = BuildingRecord::new(1)
            .with_value(QOI_PEAK_KW, "7")
            .with_value(
                "upgrade_costs.option_01_name",
                "HVAC Heating Efficiency|ASHP, SEER 15, 8.5 HSPF",
            );
        let o = eval.evaluate_building(&base, &up, Some(50.0)).expect("should evaluate");
        assert!(!o.new_hvac);
        assert_eq!(o.load_study_va, 0.0);
        assert!(!o.replace_load_study);
    }

    #[test]
    fn evaluate_aligns_tables_and_names_upgrade() {
        let eval = UpgradeEvaluator::new(&ColumnDemand, &ColumnStudy, PeakSource::Qoi, &[25.0]);
        let (base, up) = pair("4", "6");
        let mut extra = base.clone();
        extra.building_id = 2;
        let baseline = ResultsTable::from_records([base, extra]);
        let upgrade = ResultsTable::from_records([
            up.with_value("apply_upgrade.upgrade_name", "Heat pump"),
            BuildingRecord::new(3),
        ]);
        let amps = BTreeMap::new();
        let s = eval.evaluate(1, &baseline, &amps, &upgrade).expect("should evaluate");
        assert_eq!(s.upgrade_name, "Heat pump");
        assert_eq!(s.replacement.n_applicable, 2.5);
        assert_eq!(s.peak_increase.fractions, vec![(25.0, Some(1.0))]);
        // no baseline amperage -> never likely
        assert_eq!(s.replacement.load_study, Some(0.0));
    }
}
