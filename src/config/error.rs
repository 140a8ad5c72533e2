use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration failures. All of them abort before the rotation loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Failed to read {path}: {source}")]
    ReadList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Address pool in {0} is empty")]
    EmptyAddressPool(PathBuf),

    #[error("Interval must be greater than 0 seconds")]
    InvalidInterval,
}
