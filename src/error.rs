use std::path::PathBuf;

use thiserror::Error;

/// Failure of the key-value store backing the history.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid priority order {given:?}: expected each of / * + - exactly once")]
    InvalidPriority { given: String },
}

/// Oddities noticed while evaluating. These are classified for callers and
/// tests but never returned as `Err`: the numeric result is passed through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("empty operand")]
    EmptyOperand,

    #[error("division by zero")]
    DivisionByZero,

    #[error("operand {fragment:?} is not a plain integer")]
    Malformed { fragment: String },
}
