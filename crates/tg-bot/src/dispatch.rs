//! Message dispatch loop.
//!
//! One message is processed fully, through a command's `run`, before
//! the next is read. Commands are consulted in registry order and the
//! first enabled match wins; later commands are never asked.

use crate::commands::Command;
use crate::error::AppResult;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};
use tokio::signal::unix::{signal, SignalKind};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Incoming text starting with this bypasses dispatch and produces the
/// help listing instead.
const HELP_TRIGGER: &str = "!help";

pub struct Dispatcher {
    commands: Vec<Box<dyn Command>>,
    monitored_chat: Option<String>,
    sink: Arc<TgSink>,
}

impl Dispatcher {
    /// Build a dispatcher over a fixed, ordered command registry.
    pub fn new(
        commands: Vec<Box<dyn Command>>,
        monitored_chat: Option<String>,
        sink: Arc<TgSink>,
    ) -> Self {
        Self {
            commands,
            monitored_chat,
            sink,
        }
    }

    /// Read messages until the stream ends (subprocess exit) or a
    /// SIGINT arrives. Cancellation is checked at the top of every
    /// iteration; an in-flight command always finishes first.
    pub async fn run_loop(&self, stream: impl Stream<Item = ChatMessage>) -> AppResult<()> {
        // The listener must outlive the loop: it is installed here,
        // before the first read, and a signal delivered while a
        // command runs is picked up on the next iteration.
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::pin!(stream);
        loop {
            tokio::select! {
                biased;
                _ = sigint.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
                msg = stream.next() => match msg {
                    Some(msg) => self.handle(&msg).await,
                    None => {
                        info!("Input stream ended");
                        break;
                    }
                },
            }
        }
        Ok(())
    }

    /// Route one parsed message.
    pub async fn handle(&self, msg: &ChatMessage) {
        if let Some(monitored) = &self.monitored_chat {
            if monitored != &msg.chat {
                debug!("Ignoring message in unmonitored chat {}", msg.chat);
                return;
            }
        }

        if msg.text.starts_with(HELP_TRIGGER) {
            self.send_help(&msg.chat).await;
            return;
        }

        for command in &self.commands {
            if command.enabled() && command.matches(&msg.text) {
                debug!("Dispatching to {}", command.name());
                if let Err(e) = command.run(msg).await {
                    error!("Command {} failed: {}", command.name(), e);
                }
                return;
            }
        }
        debug!("No command matched: {}", msg.text);
    }

    /// One help line per enabled command, in registry order.
    async fn send_help(&self, chat: &str) {
        for command in &self.commands {
            if !command.enabled() {
                continue;
            }
            let line = format!("- {}: {}", command.syntax(), command.description());
            if let Err(e) = self.sink.msg(chat, &line).await {
                error!("Failed to send help line: {}", e);
                return;
            }
        }
    }

    /// Shut down every enabled command, in registry order. Failures
    /// are logged and do not stop the remaining shutdowns.
    pub async fn shutdown_all(&self) {
        for command in &self.commands {
            if !command.enabled() {
                continue;
            }
            if let Err(e) = command.shutdown().await {
                warn!("Shutdown of {} failed: {}", command.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};

    struct FakeCommand {
        name: &'static str,
        enabled: bool,
        trigger: &'static str,
        syntax: &'static str,
        description: &'static str,
        runs: Arc<Mutex<Vec<String>>>,
        shutdowns: Arc<AtomicUsize>,
        fail_run: bool,
        fail_shutdown: bool,
    }

    impl FakeCommand {
        fn new(name: &'static str, trigger: &'static str) -> Self {
            Self {
                name,
                enabled: true,
                trigger,
                syntax: "!x message",
                description: "a fake command",
                runs: Arc::new(Mutex::new(Vec::new())),
                shutdowns: Arc::new(AtomicUsize::new(0)),
                fail_run: false,
                fail_shutdown: false,
            }
        }

        fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }

        fn failing_run(mut self) -> Self {
            self.fail_run = true;
            self
        }

        fn failing_shutdown(mut self) -> Self {
            self.fail_shutdown = true;
            self
        }
    }

    #[async_trait]
    impl Command for FakeCommand {
        fn name(&self) -> &str {
            self.name
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        fn syntax(&self) -> &str {
            self.syntax
        }

        fn description(&self) -> &str {
            self.description
        }

        fn matches(&self, text: &str) -> bool {
            text.starts_with(self.trigger)
        }

        async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
            self.runs.lock().unwrap().push(msg.text.clone());
            if self.fail_run {
                return Err(AppError::Command("fake run failure".into()));
            }
            Ok(())
        }

        async fn shutdown(&self) -> AppResult<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            if self.fail_shutdown {
                return Err(AppError::Command("fake shutdown failure".into()));
            }
            Ok(())
        }
    }

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            chat: "room42".into(),
            sender: "alice".into(),
            text: text.into(),
        }
    }

    fn test_sink() -> (Arc<TgSink>, DuplexStream) {
        let (tx, rx) = tokio::io::duplex(4096);
        (Arc::new(TgSink::new(tx)), rx)
    }

    async fn read_lines(rx: DuplexStream, n: usize) -> Vec<String> {
        let mut lines = BufReader::new(rx).lines();
        let mut out = Vec::new();
        for _ in 0..n {
            out.push(lines.next_line().await.unwrap().unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let (sink, _rx) = test_sink();
        let a = FakeCommand::new("a", "!x");
        let b = FakeCommand::new("b", "!x");
        let (a_runs, b_runs) = (a.runs.clone(), b.runs.clone());

        let dispatcher = Dispatcher::new(vec![Box::new(a), Box::new(b)], None, sink);
        dispatcher.handle(&message("!x hello")).await;

        assert_eq!(a_runs.lock().unwrap().as_slice(), ["!x hello"]);
        assert!(b_runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_command_is_skipped_for_matching() {
        let (sink, _rx) = test_sink();
        let a = FakeCommand::new("a", "!x").disabled();
        let b = FakeCommand::new("b", "!x");
        let (a_runs, b_runs) = (a.runs.clone(), b.runs.clone());

        let dispatcher = Dispatcher::new(vec![Box::new(a), Box::new(b)], None, sink);
        dispatcher.handle(&message("!x hello")).await;

        assert!(a_runs.lock().unwrap().is_empty());
        assert_eq!(b_runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_silent() {
        let (sink, rx) = test_sink();
        let a = FakeCommand::new("a", "!x");
        let a_runs = a.runs.clone();

        let dispatcher = Dispatcher::new(vec![Box::new(a)], None, sink);
        dispatcher.handle(&message("!unknown")).await;
        drop(dispatcher);

        assert!(a_runs.lock().unwrap().is_empty());
        let mut lines = BufReader::new(rx).lines();
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unmonitored_chat_is_dropped() {
        let (sink, rx) = test_sink();
        let a = FakeCommand::new("a", "!x");
        let a_runs = a.runs.clone();

        let dispatcher =
            Dispatcher::new(vec![Box::new(a)], Some("another_room".into()), sink);
        dispatcher.handle(&message("!x hello")).await;
        // Help is filtered by the policy too.
        dispatcher.handle(&message("!help")).await;
        drop(dispatcher);

        assert!(a_runs.lock().unwrap().is_empty());
        let mut lines = BufReader::new(rx).lines();
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_monitored_chat_still_dispatches() {
        let (sink, _rx) = test_sink();
        let a = FakeCommand::new("a", "!x");
        let a_runs = a.runs.clone();

        let dispatcher = Dispatcher::new(vec![Box::new(a)], Some("room42".into()), sink);
        dispatcher.handle(&message("!x hello")).await;

        assert_eq!(a_runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_help_lists_enabled_commands_in_order() {
        let (sink, rx) = test_sink();
        let mut a = FakeCommand::new("a", "!a");
        a.syntax = "!a [tags]";
        a.description = "first: with a colon inside";
        let mut b = FakeCommand::new("b", "!b").disabled();
        b.syntax = "!b item";
        let mut c = FakeCommand::new("c", "!c");
        c.syntax = "!c query";
        c.description = "third";
        let (a_runs, c_runs) = (a.runs.clone(), c.runs.clone());

        let dispatcher =
            Dispatcher::new(vec![Box::new(a), Box::new(b), Box::new(c)], None, sink);
        dispatcher.handle(&message("!help")).await;
        drop(dispatcher);

        let lines = read_lines(rx, 2).await;
        // Syntax and description survive verbatim, delimiter included.
        assert_eq!(lines[0], "msg room42 - !a [tags]: first: with a colon inside");
        assert_eq!(lines[1], "msg room42 - !c query: third");

        // Help never dispatches.
        assert!(a_runs.lock().unwrap().is_empty());
        assert!(c_runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_error_does_not_stop_dispatch() {
        let (sink, _rx) = test_sink();
        let a = FakeCommand::new("a", "!x").failing_run();
        let a_runs = a.runs.clone();

        let dispatcher = Dispatcher::new(vec![Box::new(a)], None, sink);
        dispatcher.handle(&message("!x one")).await;
        dispatcher.handle(&message("!x two")).await;

        assert_eq!(a_runs.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_is_best_effort_and_in_order() {
        let (sink, _rx) = test_sink();
        let a = FakeCommand::new("a", "!a").failing_shutdown();
        let b = FakeCommand::new("b", "!b");
        let c = FakeCommand::new("c", "!c").disabled();
        let (a_downs, b_downs, c_downs) =
            (a.shutdowns.clone(), b.shutdowns.clone(), c.shutdowns.clone());

        let dispatcher =
            Dispatcher::new(vec![Box::new(a), Box::new(b), Box::new(c)], None, sink);
        dispatcher.shutdown_all().await;

        assert_eq!(a_downs.load(Ordering::SeqCst), 1);
        assert_eq!(b_downs.load(Ordering::SeqCst), 1);
        // Disabled commands are never shut down.
        assert_eq!(c_downs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_loop_drains_stream_and_skips_garbage() {
        let (sink, _rx) = test_sink();
        let a = FakeCommand::new("a", "!x");
        let a_runs = a.runs.clone();

        let dispatcher = Dispatcher::new(vec![Box::new(a)], None, sink);
        let input = "noise\n[MSG] room42 alice !x one\nbad line\n[MSG] room42 bob !x two\n";
        let receiver = tg_client::MessageReceiver::new(input.as_bytes());
        dispatcher.run_loop(receiver.stream()).await.unwrap();

        assert_eq!(a_runs.lock().unwrap().as_slice(), ["!x one", "!x two"]);
    }
}
