//! telegram-cli pipe transport.
//!
//! Owns the external telegram-cli subprocess and exposes its stdout as
//! a stream of parsed [`ChatMessage`]s and its stdin as a [`TgSink`]
//! speaking the one-command-per-line protocol.

mod error;
mod process;
mod receiver;
mod sink;
mod types;

pub use error::TgError;
pub use process::{ChildHandle, TgProcess};
pub use receiver::MessageReceiver;
pub use sink::TgSink;
pub use types::ChatMessage;
