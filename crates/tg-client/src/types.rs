//! Wire protocol types for the telegram-cli pipe.

/// An incoming chat message parsed from the subprocess stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Chat (conversation) identifier, no embedded spaces.
    pub chat: String,
    /// Sender identifier, no embedded spaces.
    pub sender: String,
    /// Message text, the verbatim remainder of the line.
    pub text: String,
}

impl ChatMessage {
    /// Parse one raw line of the wire shape `[MSG] <chat> <sender> <text>`.
    ///
    /// Returns `None` for any line that does not match; callers drop
    /// such lines without producing output. The text remainder is kept
    /// verbatim, trimming is up to individual commands.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("[MSG] ")?;
        let (chat, rest) = rest.split_once(' ')?;
        let (sender, text) = rest.split_once(' ')?;
        if chat.is_empty() || sender.is_empty() {
            return None;
        }

        Some(Self {
            chat: chat.to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
        })
    }
}
