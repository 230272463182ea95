//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Transport error: {0}")]
    Tg(#[from] tg_client::TgError),

    #[error("Media error: {0}")]
    Media(#[from] media_store::MediaError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command error: {0}")]
    Command(String),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
