use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabError>;

#[derive(Debug, Error)]
pub enum LabError {
    /// A mode letter outside `A`, `B`, `C`.
    #[error("invalid experiment mode: {0:?} (expected A, B or C)")]
    InvalidMode(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("dashboard failed: {0}")]
    Dashboard(String),
}
