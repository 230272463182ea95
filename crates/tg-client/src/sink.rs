//! Outgoing line sink over the subprocess stdin.

use crate::error::TgError;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

/// Shared line sink speaking the telegram-cli command protocol.
///
/// Each verb writes exactly one line and flushes it before releasing
/// the writer, so lines from concurrent callers never interleave and
/// reach the subprocess in write order. The writer is generic so tests
/// can substitute an in-memory pipe for the child stdin.
pub struct TgSink {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl TgSink {
    /// Wrap a writer, typically the child process stdin.
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Send a text message to a chat.
    pub async fn msg(&self, chat: &str, text: &str) -> Result<(), TgError> {
        self.write_line(&format!("msg {} {}", chat, text)).await
    }

    /// Send a local file to a chat as a photo.
    pub async fn send_photo(&self, chat: &str, path: &str) -> Result<(), TgError> {
        self.write_line(&format!("send_photo {} {}", chat, path))
            .await
    }

    /// Send a local file to a chat as a document.
    pub async fn send_document(&self, chat: &str, path: &str) -> Result<(), TgError> {
        self.write_line(&format!("send_document {} {}", chat, path))
            .await
    }

    async fn write_line(&self, line: &str) -> Result<(), TgError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        debug!("Sent: {}", line);
        Ok(())
    }
}
