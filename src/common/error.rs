//! Error types for configuration loading.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TunablesError {
    #[error("Failed to read tunables file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in tunables: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid tunable '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}
