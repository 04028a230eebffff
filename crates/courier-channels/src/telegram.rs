//! Telegram Bot channel — long polling + message sending via Bot API.

use async_trait::async_trait;
use courier_core::error::{CourierError, Result};
use courier_core::types::{IncomingMessage, MessageSender};
use serde::{Deserialize, Serialize};

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_poll_interval() -> u64 {
    1
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// Telegram Bot channel with polling loop.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    last_update_id: i64,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            last_update_id: 0,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{}",
            self.config.bot_token, method
        )
    }

    /// Get updates using long polling.
    pub async fn get_updates(&mut self) -> Result<Vec<TelegramUpdate>> {
        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[
                ("offset", (self.last_update_id + 1).to_string()),
                ("timeout", "30".into()),
                ("allowed_updates", "[\"message\"]".into()),
            ])
            .send()
            .await
            .map_err(|e| CourierError::Channel(format!("Telegram getUpdates failed: {e}")))?;

        let body: TelegramApiResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| CourierError::Channel(format!("Invalid Telegram response: {e}")))?;

        if !body.ok {
            return Err(CourierError::Telegram(
                body.description.unwrap_or_default(),
            ));
        }

        let updates = body.result.unwrap_or_default();
        if let Some(last) = updates.last() {
            self.last_update_id = last.update_id;
        }
        Ok(updates)
    }

    /// Send a text message. HTML markup enabled — queue texts rely on it.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| CourierError::Channel(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| CourierError::Channel(format!("Invalid send response: {e}")))?;

        if !result.ok {
            return Err(CourierError::Telegram(
                result.description.unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// Send typing indicator. Failures are not interesting.
    pub async fn send_typing(&self, chat_id: i64) {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": "typing",
        });
        if let Err(e) = self
            .client
            .post(self.api_url("sendChatAction"))
            .json(&body)
            .send()
            .await
        {
            tracing::debug!("sendChatAction failed: {e}");
        }
    }

    /// Get bot info.
    pub async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| CourierError::Channel(format!("getMe failed: {e}")))?;
        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| CourierError::Channel(format!("Invalid getMe response: {e}")))?;
        body.result
            .ok_or_else(|| CourierError::Channel("No bot info".into()))
    }
}

#[async_trait]
impl MessageSender for TelegramChannel {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    pub title: Option<String>,
}

impl TelegramUpdate {
    /// Convert to an IncomingMessage. Private text messages only;
    /// messages from bots are skipped.
    pub fn to_incoming(&self) -> Option<IncomingMessage> {
        let msg = self.message.as_ref()?;
        let text = msg.text.as_ref()?;
        let from = msg.from.as_ref()?;

        if from.is_bot || msg.chat.chat_type != "private" {
            return None;
        }

        Some(IncomingMessage {
            chat_id: msg.chat.id,
            sender_id: from.id,
            sender_name: Some(format!(
                "{}{}",
                from.first_name,
                from.last_name
                    .as_deref()
                    .map(|l| format!(" {l}"))
                    .unwrap_or_default()
            )),
            username: from.username.clone(),
            text: text.clone(),
            timestamp: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_json(is_bot: bool, chat_type: &str) -> TelegramUpdate {
        serde_json::from_value(serde_json::json!({
            "update_id": 7,
            "message": {
                "message_id": 1,
                "from": {"id": 42, "is_bot": is_bot, "first_name": "Ada", "last_name": "L", "username": "ada"},
                "chat": {"id": 42, "type": chat_type},
                "text": "/start promo",
                "date": 0
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_to_incoming() {
        let msg = update_json(false, "private").to_incoming().unwrap();
        assert_eq!(msg.chat_id, 42);
        assert_eq!(msg.sender_name.as_deref(), Some("Ada L"));
        assert_eq!(msg.start_payload(), Some("promo"));
    }

    #[test]
    fn test_to_incoming_skips_bots_and_groups() {
        assert!(update_json(true, "private").to_incoming().is_none());
        assert!(update_json(false, "group").to_incoming().is_none());
    }

    #[test]
    fn test_api_response_error_shape() {
        let body: TelegramApiResponse<Vec<TelegramUpdate>> = serde_json::from_str(
            r#"{"ok": false, "description": "Unauthorized"}"#,
        )
        .unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Unauthorized"));
    }
}
