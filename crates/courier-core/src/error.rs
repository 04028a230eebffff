//! Unified error types for Courier.

use thiserror::Error;

/// Result type alias using CourierError.
pub type Result<T> = std::result::Result<T, CourierError>;

#[derive(Error, Debug)]
pub enum CourierError {
    // Channel errors
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    // Queue errors
    #[error("Queue error: {0}")]
    Queue(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl CourierError {
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn telegram(msg: impl Into<String>) -> Self {
        Self::Telegram(msg.into())
    }

    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
