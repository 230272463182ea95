//! Tweet command - posts a message to a tweet endpoint.

use crate::commands::Command;
use crate::config::TweetConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};

/// Hard length cap enforced before any network call.
const TWEET_MAX_CHARS: usize = 140;

#[derive(Debug, Serialize)]
struct TweetRequest<'a> {
    text: &'a str,
}

/// `!tw text` posts the text as a tweet, rejecting anything over the
/// length cap with a user-visible reply.
pub struct TweetCommand {
    sink: Arc<TgSink>,
    config: TweetConfig,
    re: Regex,
    client: Client,
}

impl TweetCommand {
    pub fn new(sink: Arc<TgSink>, config: TweetConfig) -> Self {
        Self {
            sink,
            config,
            re: Regex::new(r"^!tw .+").expect("valid regex"),
            client: Client::new(),
        }
    }

    async fn post_tweet(&self, text: &str) -> AppResult<()> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .json(&TweetRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Command(format!(
                "tweet endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Command for TweetCommand {
    fn name(&self) -> &str {
        "tweet"
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn syntax(&self) -> &str {
        "!tw tweet"
    }

    fn description(&self) -> &str {
        "Tweet a message"
    }

    fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        let tweet_text = msg.text.strip_prefix("!tw").unwrap_or(&msg.text).trim();

        let chars = tweet_text.chars().count();
        if chars > TWEET_MAX_CHARS {
            self.sink
                .msg(
                    &msg.chat,
                    &format!("{} chars? Mmm too much for me, size actually matters", chars),
                )
                .await?;
            return Err(AppError::Command("invalid message length".into()));
        }

        match self.post_tweet(tweet_text).await {
            Ok(()) => {
                self.sink
                    .msg(&msg.chat, "Congrats you did it, new boring tweet posted")
                    .await?
            }
            Err(e) => {
                self.sink
                    .msg(&msg.chat, "Useless humans...something went wrong")
                    .await?;
                return Err(e);
            }
        }
        Ok(())
    }
}
