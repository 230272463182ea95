//! Voice command - text to speech via a translate endpoint.

use crate::commands::Command;
use crate::config::VoiceConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use media_store::MediaStore;
use regex::Regex;
use std::sync::Arc;
use tg_client::{ChatMessage, TgSink};
use urlencoding::encode;

/// `!v message` (or `!ves` / `!ven` / `!vfr`) fetches a spoken mp3 of
/// the message and sends it as a document. Default language is `es`.
pub struct VoiceCommand {
    sink: Arc<TgSink>,
    config: VoiceConfig,
    re: Regex,
    store: MediaStore,
}

impl VoiceCommand {
    pub fn new(sink: Arc<TgSink>, config: VoiceConfig) -> Self {
        Self {
            sink,
            config,
            re: Regex::new(r"^!v(es|en|fr)? (.+)$").expect("valid regex"),
            store: MediaStore::new("voice"),
        }
    }
}

fn tts_url(endpoint: &str, lang: &str, text: &str) -> String {
    let lang = if lang.is_empty() { "es" } else { lang };
    format!("{}?tl={}&q={}", endpoint, encode(lang), encode(text))
}

#[async_trait]
impl Command for VoiceCommand {
    fn name(&self) -> &str {
        "voice"
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    fn syntax(&self) -> &str {
        "!v[en|es|fr] message"
    }

    fn description(&self) -> &str {
        "Text to speech generator courtesy of google translate"
    }

    fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    async fn run(&self, msg: &ChatMessage) -> AppResult<()> {
        let captures = self
            .re
            .captures(&msg.text)
            .ok_or_else(|| AppError::Command("voice text did not match".into()))?;
        let lang = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let text = captures.get(2).map(|m| m.as_str()).unwrap_or("");

        let url = tts_url(&self.config.endpoint, lang, text);
        match self.store.download(&url, ".mp3").await {
            Ok(path) => {
                self.sink
                    .send_document(&msg.chat, &path.to_string_lossy())
                    .await?
            }
            Err(e) => {
                self.sink.msg(&msg.chat, "error: cannot get sound").await?;
                return Err(e.into());
            }
        }
        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        self.store.cleanup().await?;
        Ok(())
    }
}
