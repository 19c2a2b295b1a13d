//! Panel upgrade entry point: CLI wiring, logging, and the community run.

use std::process;

use clap::Parser;
use tracing::{error, info};

use panel_upgrade::cli::Args;
use panel_upgrade::logging;
use panel_upgrade::runner;

fn main() {
    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Nothing under data_dir is touched until the config is known to be valid.
    let errors = config.validate();
    if !errors.is_empty() {
        logging::init(None).ok();
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let log_file = logging::log_path(&config.run.data_dir, &config.run.community);
    let guard = match logging::init(Some(&log_file)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    match runner::run(&config) {
        Ok(summary) => {
            info!(
                peak_increase = %summary.peak_increase_path.display(),
                replacement = %summary.replacement_path.display(),
                "done"
            );
        }
        Err(e) => {
            error!("{e}");
            drop(guard);
            process::exit(1);
        }
    }
}
