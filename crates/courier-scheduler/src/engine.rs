//! Scheduler engine — the polling loop that drains due notifications.
//!
//! One logical worker: cycles never overlap, items are processed in queue
//! order, and the only yield points are the delivery backoff and the idle
//! wait between ticks. Shutdown is cooperative — checked between idle ticks
//! and between items, never mid-attempt, so an in-flight item's update is
//! always emitted before the loop exits.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::delivery::{DeliveryClient, SendOutcome};
use crate::queue::{parse_scheduled_at, Notification, NotificationStatus, NotificationUpdate};
use crate::resolver;
use crate::store::NotificationStore;

/// Nominal pause between cycles.
const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(30);
/// Idle wait granularity; bounds shutdown latency.
const IDLE_TICK: Duration = Duration::from_secs(1);

/// Drives the load → filter → resolve → deliver → record pipeline.
pub struct NotificationScheduler {
    store: NotificationStore,
    delivery: DeliveryClient,
    /// Ids delivered during this process lifetime. Guards against duplicate
    /// sends when the queue file lags behind emitted updates.
    sent_ids: HashSet<String>,
    cycle_interval: Duration,
}

impl NotificationScheduler {
    pub fn new(store: NotificationStore, delivery: DeliveryClient) -> Self {
        Self {
            store,
            delivery,
            sent_ids: HashSet::new(),
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
        }
    }

    pub fn with_cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }

    /// Run one full cycle against the queue as of `now`.
    /// Returns the update records emitted this cycle, in queue order.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Vec<NotificationUpdate> {
        self.cycle(now, None).await
    }

    async fn cycle(
        &mut self,
        now: DateTime<Utc>,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Vec<NotificationUpdate> {
        let items = self.store.load_all();
        if items.is_empty() {
            tracing::debug!("Queue empty, nothing to do");
            return Vec::new();
        }

        let mut updates = Vec::new();
        for item in &items {
            if shutdown.is_some_and(|s| *s.borrow()) {
                tracing::info!("Shutdown requested, cutting cycle short");
                break;
            }
            if let Some(update) = self.process_item(item, now).await {
                emit(&update);
                updates.push(update);
            }
        }
        updates
    }

    /// Handle a single queue row. `None` means the item was skipped and no
    /// update record is owed for it this cycle.
    async fn process_item(
        &mut self,
        item: &Notification,
        now: DateTime<Utc>,
    ) -> Option<NotificationUpdate> {
        if item.status != NotificationStatus::Pending {
            return None;
        }

        // A bad timestamp is not terminal: the item stays pending and gets
        // another look next cycle, in case the queue file is fixed up.
        let due_at = match parse_scheduled_at(&item.scheduled_at) {
            Ok(due_at) => due_at,
            Err(e) => {
                tracing::warn!(id = %item.id, "Skipping notification: {e}");
                return None;
            }
        };
        if due_at > now {
            return None;
        }

        if self.sent_ids.contains(&item.id) {
            tracing::debug!(id = %item.id, "Already delivered this process, skipping");
            return None;
        }

        // An unknown marker can never succeed by retrying.
        let Some(text) = resolver::resolve(&item.message) else {
            return Some(NotificationUpdate::failed(
                item,
                None,
                1,
                format!("unknown_message_marker:{}", item.message),
            ));
        };

        let report = self
            .delivery
            .send(item.telegram_id, &text, item.max_attempts)
            .await;

        Some(match report.outcome {
            SendOutcome::Sent => {
                self.sent_ids.insert(item.id.clone());
                NotificationUpdate::sent(item, text, report.attempts_used, now)
            }
            SendOutcome::Failed(error) => {
                NotificationUpdate::failed(item, Some(text), report.attempts_used, error)
            }
        })
    }

    /// Run forever at the configured cadence until `shutdown` flips to true.
    /// A plain next-due instant on the monotonic clock; an overrunning cycle
    /// defers the next tick rather than skipping or overlapping it.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.cycle_interval.as_secs(),
            queue = %self.store.path().display(),
            "Notification scheduler started"
        );

        let mut next_due = Instant::now();
        loop {
            if *shutdown.borrow() {
                break;
            }
            if Instant::now() >= next_due {
                let updates = self.cycle(Utc::now(), Some(&shutdown)).await;
                if !updates.is_empty() {
                    tracing::info!(count = updates.len(), "Cycle complete");
                }
                next_due = Instant::now() + self.cycle_interval;
            }
            tokio::time::sleep(IDLE_TICK).await;
        }

        tracing::info!("Notification scheduler stopped");
    }
}

/// The audit trail: one structured record per processed item, carrying the
/// full post-processing state.
fn emit(update: &NotificationUpdate) {
    tracing::info!(
        id = %update.id,
        telegram_id = update.telegram_id,
        marker = %update.message,
        status = %update.status,
        attempts = update.attempts,
        max_attempts = update.max_attempts,
        error = update.error.as_deref().unwrap_or(""),
        scheduled_at = %update.scheduled_at,
        sent_at = %update.sent_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        "Notification update"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use courier_core::error::{CourierError, Result};
    use courier_core::types::MessageSender;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records every call; fails while `failures_left` is positive.
    struct ScriptedSender {
        calls: AtomicU32,
        failures_left: AtomicU32,
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl ScriptedSender {
        fn ok() -> Arc<Self> {
            Self::failing(0)
        }

        fn failing(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                failures_left: AtomicU32::new(failures),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageSender for ScriptedSender {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(CourierError::Telegram("chat unavailable".into()));
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn scheduler_for(name: &str, queue_json: &str, sender: Arc<ScriptedSender>) -> NotificationScheduler {
        let dir = std::env::temp_dir().join("courier-test-engine");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, queue_json).unwrap();
        let delivery =
            DeliveryClient::new(sender).with_backoff(Duration::from_millis(1));
        NotificationScheduler::new(NotificationStore::new(path), delivery)
    }

    fn item_json(id: &str, marker: &str, scheduled_at: &str, status: &str) -> String {
        format!(
            r#"{{"id": "{id}", "telegram_id": 42, "message": "{marker}",
                "scheduled_at": "{scheduled_at}", "status": "{status}", "max_attempts": 3}}"#
        )
    }

    #[tokio::test]
    async fn test_due_pending_item_is_sent() {
        let sender = ScriptedSender::ok();
        let queue = format!("[{}]", item_json("a1", "welcome_1", "2020-01-01T00:00:00Z", "pending"));
        let mut scheduler = scheduler_for("sent.json", &queue, sender.clone());

        let now = Utc::now();
        let updates = scheduler.run_cycle(now).await;
        assert_eq!(updates.len(), 1);
        let update = &updates[0];
        assert_eq!(update.status, NotificationStatus::Sent);
        assert_eq!(update.attempts, 1);
        assert!(update.error.is_none());
        assert_eq!(update.sent_at, Some(now));
        assert_eq!(sender.calls(), 1);
        assert_eq!(sender.sent.lock().unwrap()[0].0, 42);
    }

    #[tokio::test]
    async fn test_always_failing_capability_exhausts_budget() {
        let sender = ScriptedSender::failing(u32::MAX);
        let queue = format!("[{}]", item_json("a1", "welcome_1", "2020-01-01T00:00:00Z", "pending"));
        let mut scheduler = scheduler_for("failed.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, NotificationStatus::Failed);
        assert_eq!(updates[0].attempts, 3);
        assert_eq!(updates[0].error.as_deref(), Some("Telegram API error: chat unavailable"));
        assert!(updates[0].sent_at.is_none());
        assert_eq!(sender.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_pending_items_untouched() {
        let sender = ScriptedSender::ok();
        let queue = format!(
            "[{},{}]",
            item_json("s1", "welcome_1", "2020-01-01T00:00:00Z", "sent"),
            item_json("f1", "welcome_1", "2020-01-01T00:00:00Z", "failed")
        );
        let mut scheduler = scheduler_for("terminal.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert!(updates.is_empty());
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn test_future_item_untouched() {
        let sender = ScriptedSender::ok();
        let future = (Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        let queue = format!("[{}]", item_json("a1", "welcome_1", &future, "pending"));
        let mut scheduler = scheduler_for("future.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert!(updates.is_empty());
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_marker_fails_without_delivery() {
        let sender = ScriptedSender::ok();
        let queue = format!("[{}]", item_json("a1", "no_such_marker", "2020-01-01T00:00:00Z", "pending"));
        let mut scheduler = scheduler_for("unknown.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, NotificationStatus::Failed);
        assert_eq!(
            updates[0].error.as_deref(),
            Some("unknown_message_marker:no_such_marker")
        );
        assert_eq!(updates[0].attempts, 1);
        assert!(updates[0].text.is_none());
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_timestamp_stays_pending_without_update() {
        let sender = ScriptedSender::ok();
        let queue = format!("[{}]", item_json("a1", "welcome_1", "soonish", "pending"));
        let mut scheduler = scheduler_for("badtime.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert!(updates.is_empty());
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn test_dedup_across_cycles_with_stale_queue() {
        let sender = ScriptedSender::ok();
        let queue = format!("[{}]", item_json("a1", "welcome_1", "2020-01-01T00:00:00Z", "pending"));
        let mut scheduler = scheduler_for("dedup.json", &queue, sender.clone());

        let first = scheduler.run_cycle(Utc::now()).await;
        assert_eq!(first.len(), 1);
        assert_eq!(sender.calls(), 1);

        // The queue file still says pending; the in-memory set must win.
        let second = scheduler.run_cycle(Utc::now()).await;
        assert!(second.is_empty());
        assert_eq!(sender.calls(), 1);
    }

    #[tokio::test]
    async fn test_one_bad_item_does_not_block_the_rest() {
        let sender = ScriptedSender::ok();
        let queue = format!(
            "[{},{}]",
            item_json("bad", "no_such_marker", "2020-01-01T00:00:00Z", "pending"),
            item_json("good", "welcome_2", "2020-01-01T00:00:00Z", "pending")
        );
        let mut scheduler = scheduler_for("mixed.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].status, NotificationStatus::Failed);
        assert_eq!(updates[1].status, NotificationStatus::Sent);
        assert_eq!(sender.calls(), 1);
    }

    #[tokio::test]
    async fn test_naive_timestamp_treated_as_utc() {
        let sender = ScriptedSender::ok();
        let queue = format!("[{}]", item_json("a1", "welcome_1", "2020-01-01T00:00:00", "pending"));
        let mut scheduler = scheduler_for("naive.json", &queue, sender.clone());

        let updates = scheduler.run_cycle(Utc::now()).await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn test_shutdown_between_items() {
        let sender = ScriptedSender::ok();
        let queue = format!(
            "[{},{}]",
            item_json("a1", "welcome_1", "2020-01-01T00:00:00Z", "pending"),
            item_json("a2", "welcome_2", "2020-01-01T00:00:00Z", "pending")
        );
        let mut scheduler = scheduler_for("shutdown.json", &queue, sender.clone());

        let (tx, rx) = watch::channel(true);
        let updates = scheduler.cycle(Utc::now(), Some(&rx)).await;
        assert!(updates.is_empty());
        assert_eq!(sender.calls(), 0);
        drop(tx);
    }
}
