//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// telegram-cli subprocess configuration
    pub tg: TgConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Echo command
    #[serde(default)]
    pub echo: EchoConfig,

    /// Roster command
    #[serde(default)]
    pub roster: RosterConfig,

    /// Quotes command
    #[serde(default)]
    pub quotes: QuotesConfig,

    /// Tweet command
    #[serde(default)]
    pub tweet: TweetConfig,

    /// Picture search command
    #[serde(default)]
    pub pics: PicsConfig,

    /// Voice command
    #[serde(default)]
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgConfig {
    /// Path to the telegram-cli binary
    pub binary: String,

    /// Path to the server public key
    pub pubkey: String,

    /// Lua script passed to telegram-cli (prints messages in wire shape)
    pub script: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Monitored chat; all chats when unset
    #[serde(default)]
    pub monitored_chat: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EchoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Quotes service endpoint
    #[serde(default)]
    pub endpoint: String,

    /// Basic auth credentials
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Tweet-posting endpoint
    #[serde(default = "default_tweet_endpoint")]
    pub endpoint: String,

    /// API bearer token
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PicsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Image search endpoint returning JSON results
    #[serde(default)]
    pub endpoint: String,

    /// Search API key
    #[serde(default)]
    pub api_key: String,

    /// Maximum number of results to pick from
    #[serde(default = "default_pics_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Text-to-speech endpoint
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,
}

// Default implementations
impl Default for BotConfig {
    fn default() -> Self {
        Self {
            monitored_chat: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            user: String::new(),
            password: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl Default for TweetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_tweet_endpoint(),
            token: String::new(),
        }
    }
}

impl Default for PicsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: String::new(),
            limit: default_pics_limit(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_tts_endpoint(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_pics_limit() -> usize {
    10
}

fn default_tts_endpoint() -> String {
    "http://translate.google.com/translate_tts".into()
}

fn default_tweet_endpoint() -> String {
    "https://api.twitter.com/2/tweets".into()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep strings as strings; telegram identifiers may
                    // otherwise be mangled by numeric parsing.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // telegram-cli prints chat titles with spaces replaced by
        // underscores; normalize the monitored chat the same way.
        config.bot.monitored_chat = config
            .bot
            .monitored_chat
            .take()
            .map(|c| c.replace(' ', "_"))
            .filter(|c| !c.is_empty());

        Ok(config)
    }
}
