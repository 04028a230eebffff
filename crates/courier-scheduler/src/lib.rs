//! # Courier Scheduler
//!
//! Scheduled notification dispatcher: reads a file-backed queue of pending
//! messages, delivers the due ones over Telegram with bounded retry, and
//! emits a structured update record per processed item.
//!
//! ## Architecture
//! ```text
//! NotificationScheduler (30s cycle, 1s idle ticks, cooperative shutdown)
//!   ├── NotificationStore: notifications.json → Vec<Notification>
//!   ├── filter: pending + due (UTC) + not already sent this process
//!   ├── resolver: marker → display text (random pick for progress slots)
//!   ├── DeliveryClient: send with retries (fixed 100ms backoff)
//!   └── NotificationUpdate: full post-state, logged as the audit trail
//! ```
//!
//! Status updates are not written back to the queue file; the emitted
//! `NotificationUpdate` records are the durability surface.

pub mod delivery;
pub mod engine;
pub mod queue;
pub mod resolver;
pub mod store;
pub mod texts;

pub use delivery::{DeliveryClient, DeliveryReport, SendOutcome};
pub use engine::NotificationScheduler;
pub use queue::{Notification, NotificationStatus, NotificationUpdate};
pub use store::NotificationStore;
