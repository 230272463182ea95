//! Pics command - image search, download, send as photo.

use crate::commands::Command;
use crate::config::PicsConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use media_store::MediaStore;
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    media_url: String,
}

/// `!p query` searches the configured image endpoint, downloads one
/// random hit into a private scratch dir and sends it as a photo.
pub struct PicsCommand {
    sink: Arc<TgSink>,
    config: PicsConfig,
    re: Regex,
    client: Client,
    store: MediaStore,
}

impl PicsCommand {
    pub fn new(sink: Arc<TgSink>, config: PicsConfig) -> Self {
        Self {
            sink,
            config,
            re: Regex::new(r"^!p ([\w ]+)$").expect("valid regex"),
            client: Client::new(),
            store: MediaStore::new("pics"),
        }
    }

    async fn search(&self, query: &str) -> AppResult<String> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("key", &self.config.api_key),
                ("limit", &self.config.limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Command(format!(
                "search service returned {}",
                response.status()
            )));
        }

        let results: SearchResponse = response.json().await?;
        let pick = results
            .results
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| AppError::Command("no pics".into()))?;
        Ok(pick.media_url.clone())
    }
}

#[async_trait]
impl Command for PicsCommand {
    fn name(&self) -> &str {
        "pics"
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn syntax(&self) -> &str {
        "!p query"
    }

    fn description(&self) -> &str {
        "Search images by query"
    }

    fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        let query = msg.text.strip_prefix("!p").unwrap_or(&msg.text).trim();

        let downloaded = match self.search(query).await {
            Ok(url) => self.store.download(&url, "").await.map_err(AppError::from),
            Err(e) => Err(e),
        };

        match downloaded {
            Ok(path) => {
                self.sink
                    .send_photo(&msg.chat, &path.to_string_lossy())
                    .await?
            }
            Err(e) => {
                self.sink.msg(&msg.chat, "error: cannot get pic").await?;
                return Err(e);
            }
        }
        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        self.store.cleanup().await?;
        Ok(())
    }
}
