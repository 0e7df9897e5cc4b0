//! Cooperative progress-event streamer for long-running actions.

use std::time::Duration;

use crate::types::NotificationEvent;

use super::SessionContext;

/// Emits a fixed number of progress notifications with a fixed inter-emission
/// delay. Emission checks session liveness before every send and aborts
/// silently once the caller is gone; the delay is purely a scheduling point.
pub struct NotificationStreamer {
    count: u32,
    interval: Duration,
}

impl NotificationStreamer {
    pub fn new(count: u32, interval: Duration) -> Self {
        Self { count, interval }
    }

    /// Stream `count` events, labelling each with `label`. Returns how many
    /// were actually emitted.
    pub async fn stream(&self, cx: &SessionContext, label: &str) -> u32 {
        let mut emitted = 0;
        for step in 1..=self.count {
            if cx.is_closed() {
                tracing::debug!("session closed, aborting stream at step {step}");
                break;
            }
            let sequence = cx.next_sequence();
            let event =
                NotificationEvent::info(format!("{label}: step {step} of {}", self.count), sequence);
            if !cx.notify(event) {
                break;
            }
            emitted += 1;
            if step < self.count {
                tokio::time::sleep(self.interval).await;
            }
        }
        emitted
    }
}
