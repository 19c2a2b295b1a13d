//! Command-line arguments. Flags override the TOML configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, PanelConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Estimate panel amperage and upgrade applicability")]
pub struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[clap(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Directory holding one sub-directory of results tables per community.
    #[clap(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    #[clap(long)]
    pub community: Option<String>,

    /// Baseline panel estimation method: peak, nec or regression.
    #[clap(long)]
    pub method: Option<String>,

    /// Panel regression model (JSON).
    #[clap(long)]
    pub model: Option<PathBuf>,

    /// Number of upgrade packages to evaluate.
    #[clap(long)]
    pub upgrades: Option<usize>,

    /// Peak demand column set: qoi or seasonal-max.
    #[clap(long = "peak-source")]
    pub peak_source: Option<String>,
}

impl Args {
    /// Loads the configuration file (or the defaults) and applies the
    /// command-line overrides. The result is not validated.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration file cannot be read or parsed.
    pub fn into_config(self) -> Result<PanelConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PanelConfig::from_toml_file(path)?,
            None => PanelConfig::default(),
        };
        let run = &mut config.run;
        if let Some(data_dir) = self.data_dir {
            run.data_dir = data_dir;
        }
        if let Some(community) = self.community {
            run.community = community;
        }
        if let Some(method) = self.method {
            run.baseline_method = method;
        }
        if let Some(model) = self.model {
            run.model_path = Some(model);
        }
        if let Some(upgrades) = self.upgrades {
            run.upgrades = upgrades;
        }
        if let Some(peak_source) = self.peak_source {
            run.peak_source = peak_source;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "panel-upgrade",
            "--community",
            "oakland",
            "--method",
            "nec",
            "--upgrades",
            "3",
            "--peak-source",
            "seasonal-max",
        ])
        .expect("arguments should parse");
        let config = args.into_config().expect("defaults should load");
        assert_eq!(config.run.community, "oakland");
        assert_eq!(config.run.baseline_method, "nec");
        assert_eq!(config.run.upgrades, 3);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("panel.toml");
        std::fs::write(&path, "[run]\ncommunity = \"fresno\"\nupgrades = 4\n").expect("write config");
        let args = Args::try_parse_from([
            "panel-upgrade",
            "--config",
            path.to_str().unwrap_or_default(),
            "--upgrades",
            "2",
        ])
        .expect("arguments should parse");
        let config = args.into_config().expect("config should load");
        assert_eq!(config.run.community, "fresno");
        assert_eq!(config.run.upgrades, 2);
    }

    #[test]
    fn rejects_unknown_flag() {
        assert!(Args::try_parse_from(["panel-upgrade", "--seed", "1"]).is_err());
    }
}
