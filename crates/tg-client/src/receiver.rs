//! Incoming message stream over the subprocess stdout.

use crate::types::ChatMessage;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::Stream;
use tracing::{debug, error};

/// Reads lines from the subprocess stdout and yields parsed messages.
pub struct MessageReceiver<R = tokio::process::ChildStdout> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Send + Unpin + 'static> MessageReceiver<R> {
    /// Create a receiver over any readable line source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Stream of parsed messages. Lines that do not match the wire
    /// shape are skipped. The stream ends on EOF (subprocess exit) or
    /// on a read error, which is logged and treated as stream end.
    pub fn stream(self) -> impl Stream<Item = ChatMessage> {
        async_stream::stream! {
            let mut lines = self.reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(msg) = ChatMessage::parse(&line) {
                            debug!(
                                "Received {} bytes from {} in {}",
                                msg.text.len(),
                                msg.sender,
                                msg.chat
                            );
                            yield msg;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Read error on subprocess stdout: {}", e);
                        break;
                    }
                }
            }
        }
    }
}
