//! Quotes command - fetches and stores quotes on a remote service.

use crate::commands::Command;
use crate::config::QuotesConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};

/// `!q` fetches the quote list and picks a random line, `!q text`
/// stores a new quote. The service speaks plain text over basic auth.
pub struct QuotesCommand {
    sink: Arc<TgSink>,
    config: QuotesConfig,
    re: Regex,
    client: Client,
}

impl QuotesCommand {
    pub fn new(sink: Arc<TgSink>, config: QuotesConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            sink,
            config,
            re: Regex::new(r"^!q($| .+$)").expect("valid regex"),
            client,
        })
    }

    async fn random_quote(&self) -> AppResult<String> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Command(format!(
                "quote service returned {}",
                response.status()
            )));
        }

        // The service returns the whole list, one quote per line; the
        // random pick happens here.
        let body = response.text().await?;
        let quotes: Vec<&str> = body.lines().filter(|l| !l.trim().is_empty()).collect();
        let pick = quotes
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| AppError::Command("no quotes".into()))?;
        Ok(pick.to_string())
    }

    async fn add_quote(&self, quote: &str) -> AppResult<()> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .body(quote.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Command(format!(
                "quote service returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Command for QuotesCommand {
    fn name(&self) -> &str {
        "quotes"
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn syntax(&self) -> &str {
        "!q [message]"
    }

    fn description(&self) -> &str {
        "If message, add a quote. Otherwise, return a random one"
    }

    fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        let quote_text = msg.text.strip_prefix("!q").unwrap_or(&msg.text).trim();

        if quote_text.is_empty() {
            match self.random_quote().await {
                Ok(quote) => {
                    self.sink
                        .msg(&msg.chat, &format!("Random quote: {}", quote))
                        .await?
                }
                Err(e) => {
                    self.sink.msg(&msg.chat, "error: cannot get quote").await?;
                    return Err(e);
                }
            }
        } else {
            let quote = format!("{}: {}", msg.sender, quote_text);
            match self.add_quote(&quote).await {
                Ok(()) => {
                    self.sink
                        .msg(&msg.chat, &format!("New quote added: \"{}\"", quote))
                        .await?
                }
                Err(e) => {
                    self.sink.msg(&msg.chat, "error: cannot add quote").await?;
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
