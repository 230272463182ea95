//! Transport errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("subprocess is missing its {0} pipe")]
    MissingPipe(&'static str),
}
