//! # Courier Channels
//! Chat platform integration. Telegram is the only channel.

pub mod telegram;

pub use telegram::{TelegramChannel, TelegramConfig};
