//! Roster command - a shared in-memory item list.

use crate::commands::Command;
use crate::config::RosterConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};
use tokio::sync::Mutex;

/// `!b item` adds, `!b` lists, `!b- n` removes item n, `!b-` resets.
/// The list lives in memory only and is lost at shutdown.
pub struct RosterCommand {
    sink: Arc<TgSink>,
    config: RosterConfig,
    re: Regex,
    items: Mutex<Vec<String>>,
}

impl RosterCommand {
    pub fn new(sink: Arc<TgSink>, config: RosterConfig) -> Self {
        Self {
            sink,
            config,
            re: Regex::new(r"^!b(($| [^\r\n]+$)|(-$|- \d+$))").expect("valid regex"),
            items: Mutex::new(Vec::new()),
        }
    }

    async fn add_item(&self, chat: &str, sender: &str, text: &str) -> AppResult<()> {
        let item = format!("{}: {}", sender, text);
        self.items.lock().await.push(item.clone());
        self.sink
            .msg(chat, &format!("New item added: \"{}\"", item))
            .await?;
        Ok(())
    }

    async fn list_items(&self, chat: &str) -> AppResult<()> {
        let items = self.items.lock().await;
        if items.is_empty() {
            return Err(AppError::Command("no items".into()));
        }
        for (i, item) in items.iter().enumerate() {
            self.sink.msg(chat, &format!("[{}] {}", i, item)).await?;
        }
        Ok(())
    }

    async fn reset(&self, chat: &str) -> AppResult<()> {
        self.items.lock().await.clear();
        self.sink.msg(chat, "The list has been reset").await?;
        Ok(())
    }

    async fn remove_item(&self, chat: &str, text: &str) -> AppResult<()> {
        let n: usize = text
            .parse()
            .map_err(|_| AppError::Command(format!("bad index: {}", text)))?;
        let mut items = self.items.lock().await;
        if n >= items.len() {
            return Err(AppError::Command(format!("no item {}", n)));
        }
        let item = items.remove(n);
        drop(items);
        self.sink
            .msg(chat, &format!("Item removed: \"{}\"", item))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Command for RosterCommand {
    fn name(&self) -> &str {
        "roster"
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn syntax(&self) -> &str {
        "!b[-] [item]"
    }

    fn description(&self) -> &str {
        "If item, add it to the list. Otherwise, return the list. \
         !b- [n]: If n, remove item n. Otherwise, reset the list."
    }

    fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        let result = if let Some(rest) = msg.text.strip_prefix("!b-") {
            let rest = rest.trim();
            if rest.is_empty() {
                self.reset(&msg.chat).await
            } else {
                self.remove_item(&msg.chat, rest).await
            }
        } else {
            let rest = msg.text.strip_prefix("!b").unwrap_or(&msg.text).trim();
            if rest.is_empty() {
                self.list_items(&msg.chat).await
            } else {
                self.add_item(&msg.chat, &msg.sender, rest).await
            }
        };

        if let Err(e) = result {
            self.sink
                .msg(&msg.chat, "error: cannot get or change the list")
                .await?;
            return Err(e);
        }
        Ok(())
    }
}
