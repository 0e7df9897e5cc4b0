//! The connector trait — the only interface the action server requires of an
//! upstream integration.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::credentials::Credentials;
use crate::error::ConnectorResult;

/// One upstream service, mock or live.
///
/// `operation` is a dotted name like `tickets.create`; `params` and the
/// returned payload are raw JSON. Field mapping to and from domain shapes is
/// the caller's concern.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Human-readable service name, used in logs and error messages.
    fn service(&self) -> &str;

    async fn call(
        &self,
        operation: &str,
        params: Value,
        creds: &Credentials,
    ) -> ConnectorResult<Value>;
}

/// The connector bundle one session's actions draw from.
///
/// Cloning is cheap; each session gets its own clone so no connector handle
/// is shared mutably across sessions.
#[derive(Clone)]
pub struct Connectors {
    pub helpdesk: Arc<dyn Connector>,
    pub billing: Arc<dyn Connector>,
    pub scheduling: Arc<dyn Connector>,
}

impl Connectors {
    /// Bundle backed entirely by the in-memory mocks.
    pub fn mock() -> Self {
        Self {
            helpdesk: Arc::new(crate::mock::MockHelpdesk::new()),
            billing: Arc::new(crate::mock::MockBilling::new()),
            scheduling: Arc::new(crate::mock::MockScheduling::new()),
        }
    }
}
