//! Per-request transport session: registry ownership, lifecycle state, and
//! the outbound event channel.
//!
//! A session is created for one inbound request and reaches exactly one of
//! `Completed` or `Closed`. Notifications and the terminal result travel the
//! same ordered channel, so a consumer can never observe them out of order or
//! mistake one for the other.

pub mod streamer;

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::actions::ActionRegistry;
use crate::types::{JsonRpcNotification, NotificationEvent};

pub use streamer::NotificationStreamer;

/// Lifecycle states of a transport session. `Closed` is reachable from any
/// non-terminal state when the caller disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Connected,
    Dispatching,
    Streaming,
    Completed,
    Closed,
}

/// An ordered outbound frame: zero or more notifications, then one response.
#[derive(Debug)]
pub enum SessionEvent {
    Notification(JsonRpcNotification),
    Response(Value),
}

struct Shared {
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    sequence: AtomicU32,
    finished: AtomicBool,
}

impl Shared {
    fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        // Terminal states win; a late transition must not resurrect a session.
        if matches!(*state, SessionState::Completed | SessionState::Closed) {
            return;
        }
        *state = next;
    }

    /// Move to a terminal state. Returns true only for the first caller, so
    /// resource release happens exactly once.
    fn finish(&self, terminal: SessionState) -> bool {
        debug_assert!(matches!(
            terminal,
            SessionState::Completed | SessionState::Closed
        ));
        if self.finished.swap(true, Ordering::SeqCst) {
            return false;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = terminal;
        true
    }
}

/// One caller's execution context: a fresh action registry bound to one
/// outbound channel.
pub struct Session {
    registry: ActionRegistry,
    shared: Arc<Shared>,
}

impl Session {
    /// Create a session around a freshly populated registry. The returned
    /// receiver is the transport's end of the event channel; dropping it is
    /// the disconnect signal.
    pub fn new(registry: ActionRegistry) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            registry,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Created),
                events: tx,
                sequence: AtomicU32::new(0),
                finished: AtomicBool::new(false),
            }),
        };
        (session, rx)
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            shared: self.shared.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Channel handshake with the caller completed.
    pub fn connect(&self) {
        self.shared.set_state(SessionState::Connected);
    }

    /// An inbound envelope is being parsed and dispatched.
    pub fn dispatching(&self) {
        self.shared.set_state(SessionState::Dispatching);
    }

    /// Deliver the terminal response and complete the session. A session the
    /// caller already abandoned discards the result silently.
    pub fn complete(&self, response: Value) {
        if self.shared.state() == SessionState::Closed {
            tracing::debug!("session closed before completion, discarding result");
            return;
        }
        if self.shared.events.send(SessionEvent::Response(response)).is_err() {
            self.close();
            return;
        }
        if self.shared.finish(SessionState::Completed) {
            tracing::debug!("session completed");
        }
    }

    /// Caller disconnected. Idempotent.
    pub fn close(&self) {
        if self.shared.finish(SessionState::Closed) {
            tracing::debug!("session closed by caller disconnect");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::SeqCst)
    }
}

/// Cloneable handle handlers use to emit notifications and observe liveness.
#[derive(Clone)]
pub struct SessionContext {
    shared: Arc<Shared>,
}

impl SessionContext {
    /// Next monotonically increasing sequence number for this session.
    pub fn next_sequence(&self) -> u32 {
        self.shared.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state() == SessionState::Closed || self.shared.events.is_closed()
    }

    /// Emit a progress notification. Returns false (without error) when the
    /// session is no longer live; emission after close is silently dropped.
    pub fn notify(&self, event: NotificationEvent) -> bool {
        if self.is_closed() {
            return false;
        }
        self.shared.set_state(SessionState::Streaming);
        let params = match serde_json::to_value(&event) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("failed to serialize notification: {e}");
                return false;
            }
        };
        let notification =
            JsonRpcNotification::new("notifications/message".to_string(), Some(params));
        if self
            .shared
            .events
            .send(SessionEvent::Notification(notification))
            .is_err()
        {
            self.shared.finish(SessionState::Closed);
            return false;
        }
        true
    }

    /// Mark the session closed from the context side (used by transports when
    /// the outbound stream is dropped mid-operation).
    pub fn mark_closed(&self) {
        self.shared.finish(SessionState::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionRegistry;
    use opsbridge::Connectors;
    use serde_json::json;

    fn new_session() -> (Session, mpsc::UnboundedReceiver<SessionEvent>) {
        Session::new(ActionRegistry::with_default_actions(Connectors::mock()))
    }

    #[tokio::test]
    async fn notifications_precede_the_terminal_response() {
        let (session, mut rx) = new_session();
        session.connect();
        let cx = session.context();

        assert!(cx.notify(NotificationEvent::info("step 1", cx.next_sequence())));
        assert!(cx.notify(NotificationEvent::info("step 2", cx.next_sequence())));
        session.complete(json!({ "done": true }));

        match rx.recv().await.unwrap() {
            SessionEvent::Notification(n) => {
                assert_eq!(n.method, "notifications/message");
                assert_eq!(n.params.as_ref().unwrap()["sequence"], 1);
            }
            other => panic!("expected notification, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            SessionEvent::Notification(n) => {
                assert_eq!(n.params.as_ref().unwrap()["sequence"], 2);
            }
            other => panic!("expected notification, got {other:?}"),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionEvent::Response(_)
        ));
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn close_suppresses_further_events_and_result() {
        let (session, rx) = new_session();
        session.connect();
        let cx = session.context();

        assert!(cx.notify(NotificationEvent::info("step 1", cx.next_sequence())));
        drop(rx); // caller disconnect

        assert!(!cx.notify(NotificationEvent::info("step 2", cx.next_sequence())));
        session.complete(json!({ "done": true })); // discarded, no panic
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.is_finished());
    }

    #[tokio::test]
    async fn finish_is_exactly_once() {
        let (session, _rx) = new_session();
        session.close();
        session.close();
        session.complete(json!({}));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn sequence_numbers_are_monotonic() {
        let (session, _rx) = new_session();
        let cx = session.context();
        assert_eq!(cx.next_sequence(), 1);
        assert_eq!(cx.next_sequence(), 2);
        assert_eq!(cx.next_sequence(), 3);
    }
}
