//! telegram-cli subprocess supervision.

use crate::error::TgError;
use crate::receiver::MessageReceiver;
use crate::sink::TgSink;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::info;

/// Handle to the running telegram-cli subprocess.
///
/// Owns the child; `split` hands out the stdout half as a message
/// receiver and the stdin half as the shared outgoing sink.
pub struct TgProcess {
    child: Child,
}

impl TgProcess {
    /// Spawn telegram-cli with readline, color and own-output disabled,
    /// running the given lua script and server public key.
    pub fn spawn(binary: &str, pubkey: &str, script: &str) -> Result<Self, TgError> {
        let child = Command::new(binary)
            .args(["-R", "-C", "-D", "-s", script, "-k", pubkey])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| TgError::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        info!("Spawned {} (pid {:?})", binary, child.id());
        Ok(Self { child })
    }

    /// Split into the incoming message stream, the outgoing line sink,
    /// and the child handle kept for the final reap.
    pub fn split(mut self) -> Result<(MessageReceiver, TgSink, ChildHandle), TgError> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or(TgError::MissingPipe("stdout"))?;
        let stdin = self
            .child
            .stdin
            .take()
            .ok_or(TgError::MissingPipe("stdin"))?;

        Ok((
            MessageReceiver::new(stdout),
            TgSink::new(stdin),
            ChildHandle { child: self.child },
        ))
    }
}

/// Remaining ownership of the child after the pipes have been split off.
pub struct ChildHandle {
    child: Child,
}

impl ChildHandle {
    /// Wait for the subprocess to exit. Called after the dispatch loop
    /// has drained; a child that already exited returns immediately.
    pub async fn wait(mut self) -> Result<std::process::ExitStatus, TgError> {
        Ok(self.child.wait().await?)
    }
}
