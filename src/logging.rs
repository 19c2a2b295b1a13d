//! Logging setup: console output plus a per-community run log.

use std::fs::File;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry::Registry};

use crate::error::{PanelError, Result};

/// `<data_dir>/output__panel_upgrade__<community>.log`
pub fn log_path(data_dir: &Path, community: &str) -> std::path::PathBuf {
    data_dir.join(format!("output__panel_upgrade__{community}.log"))
}

/// Installs the global subscriber.
///
/// Console output goes to stderr. When `log_file` is given, the file is
/// truncated and receives the same events without ANSI colors. The level
/// comes from `RUST_LOG` and defaults to `info`.
///
/// The file's directory must already exist; nothing is created besides the
/// file itself.
///
/// Keep the returned guard alive for the whole run: dropping it flushes and
/// closes the log file. If a global subscriber is already installed the
/// existing one is kept.
///
/// # Errors
///
/// Returns `PanelError::Io` if the log file cannot be created, including
/// when its directory does not exist.
pub fn init(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = Registry::default().with(env_filter).with(console_layer);

    let Some(path) = log_file else {
        registry.try_init().ok();
        return Ok(None);
    };

    let file = File::create(path).map_err(|e| PanelError::io(path, e))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok();
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_named_after_community() {
        assert_eq!(
            log_path(Path::new("data"), "san_jose"),
            Path::new("data/output__panel_upgrade__san_jose.log")
        );
    }

    #[test]
    fn init_creates_log_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("run.log");
        let guard = init(Some(&path)).expect("logging should initialize");
        assert!(guard.is_some());
        assert!(path.exists());
    }

    #[test]
    fn init_does_not_create_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("no_such_dir");
        let result = init(Some(&missing.join("run.log")));
        assert!(matches!(result, Err(PanelError::Io { .. })));
        assert!(!missing.exists());
    }
}
