//! Media store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
