//! Courier configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CourierError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Telegram bot token. Usually supplied via the `BOT_TOKEN` env var.
    #[serde(default)]
    pub bot_token: String,
    /// Chat that receives service messages (startup, /start announcements).
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
    /// Path to the notification queue file.
    #[serde(default = "default_queue_path")]
    pub queue_path: PathBuf,
    /// Nominal seconds between notification cycles.
    #[serde(default = "default_cycle_secs")]
    pub cycle_interval_secs: u64,
    /// Whether to run the interactive bot front end alongside the scheduler.
    #[serde(default = "bool_true")]
    pub polling_enabled: bool,
    /// Canned replies for messages the bot does not understand.
    #[serde(default = "default_fallback_replies")]
    pub fallback_replies: Vec<String>,
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("files/notifications.json")
}
fn default_cycle_secs() -> u64 {
    30
}
fn bool_true() -> bool {
    true
}
fn default_fallback_replies() -> Vec<String> {
    vec![
        "I can only handle /start for now — everything else lives in the app.".into(),
        "Not sure what to do with that, but the app button above has you covered.".into(),
        "The team reads these eventually. For courses and progress, open the app.".into(),
    ]
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            admin_chat_id: None,
            queue_path: default_queue_path(),
            cycle_interval_secs: default_cycle_secs(),
            polling_enabled: bool_true(),
            fallback_replies: default_fallback_replies(),
        }
    }
}

impl CourierConfig {
    /// Load config from the default path (~/.courier/config.toml),
    /// falling back to defaults when the file does not exist.
    /// Environment overrides are applied either way.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific path (env overrides applied).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CourierError::Config(format!("Failed to read config: {e}")))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| CourierError::Config(format!("Failed to parse config: {e}")))?;
        config.apply_env();
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CourierError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".courier")
            .join("config.toml")
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if !token.is_empty() {
                self.bot_token = token;
            }
        }
        if let Ok(admin) = std::env::var("ADMIN_CHAT_ID") {
            if let Ok(id) = admin.parse() {
                self.admin_chat_id = Some(id);
            }
        }
    }
}
