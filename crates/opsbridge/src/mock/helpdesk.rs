//! Mock helpdesk connector (ticketing).

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connector::Connector;
use crate::credentials::Credentials;
use crate::error::{ConnectorError, ConnectorResult};

/// API token value that simulates an expired credential upstream.
pub const EXPIRED_TOKEN: &str = "expired";

const TICKET_ID_BASE: u64 = 35436;

/// Mock ticketing service. Knows a handful of fixture tickets and mints new
/// ids for created ones.
pub struct MockHelpdesk {
    next_id: AtomicU64,
}

impl MockHelpdesk {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(TICKET_ID_BASE),
        }
    }

    fn fixture_ticket(id: u64) -> Option<Value> {
        match id {
            35435 => Some(json!({
                "id": 35435,
                "subject": "Cannot log in after password reset",
                "status": "open",
                "priority": "high",
                "assignee": "support-tier2",
                "updated_at": "2026-07-30T09:12:00Z"
            })),
            35434 => Some(json!({
                "id": 35434,
                "subject": "Invoice PDF missing line items",
                "status": "solved",
                "priority": "normal",
                "assignee": "billing-team",
                "updated_at": "2026-07-18T14:03:00Z"
            })),
            _ => None,
        }
    }
}

impl Default for MockHelpdesk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MockHelpdesk {
    fn service(&self) -> &str {
        "helpdesk"
    }

    async fn call(
        &self,
        operation: &str,
        params: Value,
        creds: &Credentials,
    ) -> ConnectorResult<Value> {
        if creds.get_str("api_token") == Some(EXPIRED_TOKEN) {
            return Err(ConnectorError::unauthorized("API token expired"));
        }

        tracing::debug!(
            operation,
            token = %creds.redacted("api_token"),
            "helpdesk mock call"
        );

        match operation {
            "tickets.create" => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                Ok(json!({
                    "id": id,
                    "subject": params.get("subject").cloned().unwrap_or(Value::Null),
                    "description": params.get("description").cloned().unwrap_or(Value::Null),
                    "priority": params
                        .get("priority")
                        .cloned()
                        .unwrap_or_else(|| json!("normal")),
                    "status": "new",
                    "created_at": chrono::Utc::now().to_rfc3339()
                }))
            }
            "tickets.get" => {
                let id = params
                    .get("ticket_id")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| {
                        ConnectorError::UnexpectedShape("tickets.get requires ticket_id".into())
                    })?;
                Self::fixture_ticket(id)
                    .ok_or_else(|| ConnectorError::not_found(format!("ticket {id}")))
            }
            other => Err(ConnectorError::UnexpectedShape(format!(
                "helpdesk does not support operation '{other}'"
            ))),
        }
    }
}
