//! Scratch-dir storage for downloaded media.
//!
//! Picture and voice commands materialize remote files locally before
//! handing a path to the transport. Each command owns one
//! [`MediaStore`]; the backing directory is created on first use and
//! removed at shutdown.

mod error;
mod store;

pub use error::MediaError;
pub use store::MediaStore;
