//! Queue data model — one row per scheduled notification.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use courier_core::error::{CourierError, Result};
use serde::{Deserialize, Serialize};

/// A scheduled notification as it appears in the queue file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique id, also the dedup key within a process lifetime.
    #[serde(alias = "dedup_key")]
    pub id: String,
    /// Recipient chat id.
    pub telegram_id: i64,
    /// Symbolic message marker, resolved to display text at delivery time.
    pub message: String,
    /// Earliest delivery time, ISO-8601. Kept raw so an unparseable value
    /// leaves the item pending instead of poisoning the whole queue read.
    pub scheduled_at: String,
    #[serde(default)]
    pub status: NotificationStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

fn default_max_attempts() -> u32 {
    3
}

/// Processing state. Only `Pending` items are eligible; `Sent` and `Failed`
/// are terminal — there is no automatic re-queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStatus::Pending => write!(f, "pending"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Parse a `scheduled_at` value to UTC. RFC 3339 offsets and `Z` suffixes
/// are honored; offset-less timestamps are treated as UTC.
pub fn parse_scheduled_at(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(CourierError::Queue(format!(
        "unparseable scheduled_at '{raw}'"
    )))
}

/// Full post-processing state of one notification — the audit record emitted
/// once per processed item. Built by copying the source row and overriding
/// outcome fields explicitly; everything untouched carries over as-is.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationUpdate {
    pub id: String,
    pub telegram_id: i64,
    /// Original marker from the queue.
    pub message: String,
    /// Resolved display text that was (or would have been) delivered.
    /// `None` when the marker was unknown.
    pub text: Option<String>,
    pub scheduled_at: String,
    pub status: NotificationStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl NotificationUpdate {
    /// Successful delivery: status `sent`, error cleared, `sent_at` stamped.
    pub fn sent(
        item: &Notification,
        text: String,
        attempts_used: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: item.id.clone(),
            telegram_id: item.telegram_id,
            message: item.message.clone(),
            text: Some(text),
            scheduled_at: item.scheduled_at.clone(),
            status: NotificationStatus::Sent,
            attempts: item.attempts + attempts_used,
            max_attempts: item.max_attempts,
            error: None,
            sent_at: Some(now),
        }
    }

    /// Terminal failure: exhausted retries or an unresolvable marker.
    pub fn failed(
        item: &Notification,
        text: Option<String>,
        attempts_used: u32,
        error: String,
    ) -> Self {
        Self {
            id: item.id.clone(),
            telegram_id: item.telegram_id,
            message: item.message.clone(),
            text,
            scheduled_at: item.scheduled_at.clone(),
            status: NotificationStatus::Failed,
            attempts: item.attempts + attempts_used,
            max_attempts: item.max_attempts,
            error: Some(error),
            sent_at: item.sent_at,
        }
    }
}
