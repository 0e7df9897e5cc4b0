//! Notification types — progress events emitted before a terminal result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// One progress event. Sequence numbers are monotonically increasing per
/// session; the timestamp is the emission instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub level: NotificationLevel,
    pub data: String,
    pub sequence: u32,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl NotificationEvent {
    pub fn info(data: impl Into<String>, sequence: u32) -> Self {
        Self {
            level: NotificationLevel::Info,
            data: data.into(),
            sequence,
            timestamp: chrono::Utc::now(),
        }
    }
}
