//! Channel-facing types shared across crates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A message received from the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Chat to reply into.
    pub chat_id: i64,
    /// Sender's numeric id.
    pub sender_id: i64,
    /// Sender's display name, if known.
    pub sender_name: Option<String>,
    /// Sender's @username, if set.
    pub username: Option<String>,
    /// Text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    /// Whether this is a `/start` command, returning any deep-link payload.
    pub fn start_payload(&self) -> Option<&str> {
        let rest = self.text.strip_prefix("/start")?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix(' ').map(str::trim)
        }
    }
}

/// The "send a text message to a recipient" capability.
///
/// Implemented by the Telegram channel; the delivery client only depends on
/// this trait so tests can substitute a scripted sender.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}
