// ABOUTME: Configuration parsing from TOML file with environment variable overrides
// ABOUTME: Validates required fields and provides sensible defaults for optional ones
use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
}

// Custom Debug impl to redact bot_token
impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
        }
    }
}

// Custom Debug impl to redact api_key
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn default_endpoint() -> String {
    "https://api.cerebras.ai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "bot_memory.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Minimum time before a mention reply is sent
    #[serde(default = "default_reply_floor_ms")]
    pub reply_floor_ms: u64,
    /// Number of most recent transcript entries sent with each prompt (all if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,
    /// Personality used until one is set with /personality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_personality: Option<String>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            reply_floor_ms: default_reply_floor_ms(),
            history_window: None,
            fallback_personality: None,
        }
    }
}

impl ConversationConfig {
    pub fn reply_floor(&self) -> Duration {
        Duration::from_millis(self.reply_floor_ms)
    }
}

fn default_reply_floor_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Re-publish the stored draft when the gateway becomes ready
    #[serde(default = "default_true")]
    pub restore_on_start: bool,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            restore_on_start: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Find the config file, checking multiple locations in order:
    /// 1. VANIR_CONFIG_PATH env var (if set)
    /// 2. ./config.toml (current directory - for development)
    /// 3. ~/.config/vanir-bot/config.toml (XDG config dir)
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var("VANIR_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
        }

        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let xdg_config = paths::config_file();
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        None
    }

    /// Load configuration from the discovered config file with environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, preferring `explicit` over the discovered locations
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::find_config_file(),
        };

        let mut config = if let Some(config_path) = config_path {
            tracing::info!(
                path = %config_path.display(),
                "Loading configuration from file"
            );
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            tracing::info!("No config file found, using environment variables and defaults");
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("DISCORD_BOT_TOKEN") {
            self.discord.bot_token = val;
        }
        if let Ok(val) = std::env::var("CEREBRAS_API_KEY") {
            self.completion.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("COMPLETION_ENDPOINT") {
            self.completion.endpoint = val;
        }
        if let Ok(val) = std::env::var("COMPLETION_MODEL") {
            self.completion.model = val;
        }
        if let Ok(val) = std::env::var("DB_PATH") {
            if !val.trim().is_empty() {
                self.storage.path = val;
            }
        }
        if let Ok(val) = std::env::var("REPLY_FLOOR_MS") {
            self.conversation.reply_floor_ms = val.parse().with_context(|| {
                format!("REPLY_FLOOR_MS must be a valid number, got: {}", val)
            })?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.discord.bot_token.trim().is_empty() {
            anyhow::bail!(
                "discord.bot_token is required (set in config.toml or DISCORD_BOT_TOKEN env var)"
            );
        }
        if self.completion.endpoint.trim().is_empty() {
            anyhow::bail!("completion.endpoint must not be empty");
        }
        if self.history_window_is_zero() {
            anyhow::bail!("conversation.history_window must be at least 1 when set");
        }

        // A missing key is recoverable: each mention reports it until it is set
        if self
            .completion
            .api_key
            .as_deref()
            .map(|k| k.trim().is_empty())
            .unwrap_or(true)
        {
            tracing::warn!(
                "CEREBRAS_API_KEY is not set; mentions will fail until a completion API key is configured"
            );
            self.completion.api_key = None;
        }
        Ok(())
    }

    fn history_window_is_zero(&self) -> bool {
        self.conversation.history_window == Some(0)
    }
}
