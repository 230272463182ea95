//! Bot command handlers.

mod echo;
mod pics;
mod quotes;
mod roster;
mod tweet;
mod voice;

pub use echo::EchoCommand;
pub use pics::PicsCommand;
pub use quotes::QuotesCommand;
pub use roster::RosterCommand;
pub use tweet::TweetCommand;
pub use voice::VoiceCommand;

use crate::error::AppResult;
use async_trait::async_trait;
use tg_client::ChatMessage;

/// Command handler trait.
///
/// The dispatcher holds commands uniformly through this contract; it
/// never branches on a concrete command type.
#[async_trait]
pub trait Command: Send + Sync {
    /// Command name, used in logs.
    fn name(&self) -> &str;

    /// Whether the command is enabled in configuration. Disabled
    /// commands are never matched, listed, or shut down.
    fn enabled(&self) -> bool;

    /// Usage line (e.g. "!e message").
    fn syntax(&self) -> &str;

    /// One-line description for the help listing.
    fn description(&self) -> &str;

    /// Whether this command owns the message. Must be a pure predicate
    /// over the full text, trigger marker included.
    fn matches(&self, text: &str) -> bool;

    /// Execute the command, writing any output lines to the shared
    /// sink. The dispatcher applies no timeout; bounding slow calls is
    /// the command's own job.
    async fn run(&self, msg: &ChatMessage) -> AppResult<()>;

    /// Release privately held resources. Called exactly once per
    /// enabled command at process shutdown; must be a no-op when
    /// nothing was ever allocated.
    async fn shutdown(&self) -> AppResult<()> {
        Ok(())
    }
}
