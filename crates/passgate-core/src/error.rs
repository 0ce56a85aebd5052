use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the whole pipeline. None of these are retried;
/// each aborts the current invocation before any output sink runs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("vault proxy unreachable at {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("association rejected by the vault (remove the association file to pair again)")]
    Association,

    #[error("association file {} is malformed: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("No such entry: {0}")]
    Lookup(String),

    #[error("no login found for identifier {0}")]
    NotFound(String),

    #[error("vault proxy protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
