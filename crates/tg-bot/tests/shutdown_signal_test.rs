//! Interrupt handling around an in-flight command.
//!
//! Lives in its own test binary because it raises a real SIGINT at the
//! whole test process.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tg_bot::commands::Command;
use tg_bot::dispatch::Dispatcher;
use tg_bot::error::AppResult;
use tg_client::{ChatMessage, MessageReceiver, TgSink};

/// Raises SIGINT at the process in the middle of its own `run`, then
/// lets the runtime turn before returning.
struct InterruptingCommand {
    runs: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Command for InterruptingCommand {
    fn name(&self) -> &str {
        "interrupting"
    }

    fn enabled(&self) -> bool {
        true
    }

    fn syntax(&self) -> &str {
        "!x message"
    }

    fn description(&self) -> &str {
        "records runs, then interrupts the process"
    }

    fn matches(&self, text: &str) -> bool {
        text.starts_with("!x")
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        self.runs.lock().unwrap().push(msg.text.clone());
        unsafe {
            libc::raise(libc::SIGINT);
        }
        // Yield long enough for the signal driver to observe the
        // delivery before this command completes.
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_sigint_during_run_drains_before_next_message() {
    let (tx, _rx) = tokio::io::duplex(1024);
    let sink = Arc::new(TgSink::new(tx));

    let runs = Arc::new(Mutex::new(Vec::new()));
    let command = InterruptingCommand { runs: runs.clone() };

    let dispatcher = Dispatcher::new(vec![Box::new(command)], None, sink);

    // Both messages are available up front; the interrupt raised while
    // the first is handled must stop the loop before the second.
    let input = "[MSG] room42 alice !x one\n[MSG] room42 bob !x two\n";
    let receiver = MessageReceiver::new(input.as_bytes());
    dispatcher.run_loop(receiver.stream()).await.unwrap();

    assert_eq!(runs.lock().unwrap().as_slice(), ["!x one"]);
}
