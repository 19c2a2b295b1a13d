//! Community run: baseline panel estimation followed by every upgrade
//! scenario, ending in the two report files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::io::table::{read_table, table_path};
use crate::nec::NecCalculator;
use crate::panel::baseline::BaselineResolver;
use crate::panel::estimate::EstimationMethod;
use crate::panel::regression::LogisticPanelModel;
use crate::report::ReportAssembler;
use crate::upgrade::evaluator::UpgradeEvaluator;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Directory holding the community's tables and reports.
    pub community_dir: PathBuf,
    pub peak_increase_path: PathBuf,
    pub replacement_path: PathBuf,
    pub report: ReportAssembler,
}

/// `<data_dir>/<community>`
pub fn community_dir(config: &PanelConfig) -> PathBuf {
    config.run.data_dir.join(&config.run.community)
}

/// Runs the whole pipeline for the configured community.
///
/// Tables are read from [`community_dir`] as `up00__<community>.csv`
/// (baseline) through `upNN__<community>.csv`, and both reports are written
/// next to them.
///
/// # Errors
///
/// - `PanelError::InvalidConfig` with every validation error. Nothing is
///   read in that case; the caller reports the errors.
/// - `PanelError::Model` or `PanelError::Io` if the regression model cannot
///   be loaded.
/// - Table read errors from [`read_table`].
/// - `PanelError::DataIntegrity` if an upgrade applies an unknown parameter.
pub fn run(config: &PanelConfig) -> Result<RunSummary> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(PanelError::InvalidConfig(errors));
    }
    let method = config.baseline_method()?;
    let peak_source = config.peak_source()?;

    let model = match (method, &config.run.model_path) {
        (EstimationMethod::Regression, Some(path)) => Some(load_model(path)?),
        _ => None,
    };
    let nec = NecCalculator::new(config.nameplate.clone());

    let dir = community_dir(config);
    let community = config.run.community.as_str();
    info!(
        community,
        dir = %dir.display(),
        method = %method,
        upgrades = config.run.upgrades,
        "starting panel upgrade run"
    );

    let baseline = read_table(&table_path(&dir, community, 0))?;
    if baseline.is_empty() {
        warn!(community, "baseline has no successful buildings, every fraction is unknown");
    }
    let mut resolver = BaselineResolver::new(method, peak_source, &nec);
    if let Some(model) = &model {
        resolver = resolver.with_model(model);
    }
    let baseline_amps = resolver.estimate_table(&baseline);

    let thresholds = &config.thresholds.peak_increase_pct;
    let evaluator = UpgradeEvaluator::new(&nec, &nec, peak_source, thresholds);
    let mut report = ReportAssembler::new(community, thresholds);
    for index in 1..=config.run.upgrades {
        let upgrade = read_table(&table_path(&dir, community, index))?;
        report.push(evaluator.evaluate(index, &baseline, &baseline_amps, &upgrade)?);
    }

    let (peak_increase_path, replacement_path) = report.write_reports(&dir)?;
    info!("\n{report}");

    Ok(RunSummary {
        community_dir: dir,
        peak_increase_path,
        replacement_path,
        report,
    })
}

fn load_model(path: &Path) -> Result<LogisticPanelModel> {
    let model = LogisticPanelModel::load(path)?;
    info!(
        path = %path.display(),
        classes = model.classes().len(),
        "loaded panel regression model"
    );
    Ok(model)
}
