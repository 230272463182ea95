//! Echo command - repeats a message back to the chat.

use crate::commands::Command;
use crate::config::EchoConfig;
use crate::error::AppResult;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};

pub struct EchoCommand {
    sink: Arc<TgSink>,
    config: EchoConfig,
    re: Regex,
}

impl EchoCommand {
    pub fn new(sink: Arc<TgSink>, config: EchoConfig) -> Self {
        Self {
            sink,
            config,
            re: Regex::new(r"^!e .+").expect("valid regex"),
        }
    }
}

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn syntax(&self) -> &str {
        "!e message"
    }

    fn description(&self) -> &str {
        "Echo message"
    }

    fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        let echo_text = msg.text.strip_prefix("!e").unwrap_or(&msg.text).trim();
        self.sink
            .msg(
                &msg.chat,
                &format!("Echo: {} said \"{}\"", msg.sender, echo_text),
            )
            .await?;
        Ok(())
    }
}
