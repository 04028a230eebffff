//! Delivery client — one message to one recipient, with bounded retry.
//!
//! Known limitation: every failure is retried identically up to the budget.
//! There is no error taxonomy (a rate limit and a permanently blocked chat
//! consume the same attempts) and the backoff is a fixed pause, not
//! exponential.

use std::sync::Arc;
use std::time::Duration;

use courier_core::types::MessageSender;

/// Fixed pause between attempts.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Terminal outcome of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Description of the final attempt's error; earlier errors are dropped.
    Failed(String),
}

/// What a delivery consumed and how it ended.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub outcome: SendOutcome,
    /// 1-based index of the successful attempt, or the full budget on failure.
    pub attempts_used: u32,
}

/// Sends messages through a [`MessageSender`] with bounded retry.
pub struct DeliveryClient {
    sender: Arc<dyn MessageSender>,
    backoff: Duration,
}

impl DeliveryClient {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            sender,
            backoff: RETRY_BACKOFF,
        }
    }

    #[cfg(test)]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempt delivery up to `max_attempts` times (at least one).
    /// Faults never propagate; they are captured as the report's error text.
    pub async fn send(&self, recipient: i64, text: &str, max_attempts: u32) -> DeliveryReport {
        let budget = max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=budget {
            match self.sender.send_text(recipient, text).await {
                Ok(()) => {
                    return DeliveryReport {
                        outcome: SendOutcome::Sent,
                        attempts_used: attempt,
                    };
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!(
                        recipient,
                        attempt,
                        budget,
                        "Send attempt failed: {last_error}"
                    );
                    if attempt < budget {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        DeliveryReport {
            outcome: SendOutcome::Failed(last_error),
            attempts_used: budget,
        }
    }
}
