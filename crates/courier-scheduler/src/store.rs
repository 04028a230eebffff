//! Queue store — whole-file JSON read on every cycle.
//! No incremental reads and no in-place rewrites; the emitted update
//! records are the durability surface.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::queue::Notification;

/// Accept either a bare array of items or a wrapper object with a
/// `notifications` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum QueueFile {
    Wrapped { notifications: Vec<Notification> },
    Bare(Vec<Notification>),
}

/// File-backed notification store.
pub struct NotificationStore {
    path: PathBuf,
}

impl NotificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every notification from the queue file, in source order.
    /// A missing or malformed file is recoverable: the cycle gets an empty
    /// queue and the next cycle re-reads from scratch.
    pub fn load_all(&self) -> Vec<Notification> {
        if !self.path.exists() {
            tracing::warn!("Queue file {} not found", self.path.display());
            return Vec::new();
        }
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str(&json) {
            Ok(QueueFile::Wrapped { notifications }) => notifications,
            Ok(QueueFile::Bare(notifications)) => notifications,
            Err(e) => {
                tracing::error!("Failed to parse {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }
}
