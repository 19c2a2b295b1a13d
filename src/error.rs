//! Error type shared by the library and the binary.

use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that abort a panel-upgrade run.
///
/// Out-of-range amperage and missing values are not errors: the former is
/// logged as a warning, the latter propagates as `None`.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Invalid or unsupported configuration, detected before any table is read.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Every error reported by `PanelConfig::validate`, in field order.
    #[error("{}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error("cannot access \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed table \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("table \"{}\" has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("table \"{}\" row {row}: invalid building_id \"{value}\"", path.display())]
    InvalidBuildingId {
        path: PathBuf,
        row: usize,
        value: String,
    },

    /// An upgrade option names a parameter that the baseline characteristics
    /// do not carry: the option encoding and the characteristics schema disagree.
    #[error(
        "unknown upgrade parameter `{parameter}` from `{column}` (building {building_id})"
    )]
    DataIntegrity {
        parameter: String,
        column: String,
        building_id: u64,
    },

    #[error("panel model: {0}")]
    Model(String),
}

impl PanelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = PanelError> = std::result::Result<T, E>;
