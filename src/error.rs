//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Raised when the build configuration cannot be produced.
///
/// There is no partial success: any of these aborts the documentation build.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("version source not found: {}", path.display())]
    VersionSourceMissing { path: PathBuf },

    #[error("malformed version source {}: {reason}", path.display())]
    VersionSourceMalformed { path: PathBuf, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid loader settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigurationError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::VersionSourceMalformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
