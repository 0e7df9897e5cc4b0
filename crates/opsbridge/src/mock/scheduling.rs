//! Mock scheduling connector (meeting lookups).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connector::Connector;
use crate::credentials::Credentials;
use crate::error::{ConnectorError, ConnectorResult};

/// Mock scheduling service. One fixture invitee has meetings; everyone else
/// gets an empty collection, which is a normal (non-error) outcome.
pub struct MockScheduling;

impl MockScheduling {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockScheduling {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MockScheduling {
    fn service(&self) -> &str {
        "scheduling"
    }

    async fn call(
        &self,
        operation: &str,
        params: Value,
        creds: &Credentials,
    ) -> ConnectorResult<Value> {
        tracing::debug!(
            operation,
            token = %creds.redacted("api_token"),
            "scheduling mock call"
        );

        match operation {
            "meetings.list" => {
                let email = params.get("email").and_then(Value::as_str).ok_or_else(|| {
                    ConnectorError::UnexpectedShape("meetings.list requires email".into())
                })?;
                let collection = if email == "alice@example.com" {
                    json!([
                        {
                            "name": "Quarterly account review",
                            "start_time": "2026-09-01T15:00:00Z",
                            "status": "active",
                            "location": "https://meet.example.test/qar-2026q3"
                        },
                        {
                            "name": "Onboarding follow-up",
                            "start_time": "2026-09-03T10:30:00Z",
                            "status": "active",
                            "location": "https://meet.example.test/onboarding-42"
                        }
                    ])
                } else {
                    json!([])
                };
                Ok(json!({ "collection": collection }))
            }
            other => Err(ConnectorError::UnexpectedShape(format!(
                "scheduling does not support operation '{other}'"
            ))),
        }
    }
}
