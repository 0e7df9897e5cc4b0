//! Action: meetings_lookup — upcoming meetings for an invitee email.
//!
//! Empty-result policy: success. Zero matches yields `success: true` with an
//! empty `upcomingMeetings` array, never a failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use opsbridge::{Connector, ConnectorError, Credentials};

use crate::schema::{FieldSpec, Schema, Validated};
use crate::session::SessionContext;
use crate::types::{ActionDefinition, ActionResult};

use super::{upstream_field, ActionHandler};

pub const NAME: &str = "meetings_lookup";

pub struct MeetingsLookup {
    connector: Arc<dyn Connector>,
}

impl MeetingsLookup {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ActionHandler for MeetingsLookup {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: NAME.to_string(),
            description: Some("List upcoming meetings scheduled with an invitee".to_string()),
            input_schema: self.argument_schema().to_json_schema(),
        }
    }

    fn argument_schema(&self) -> Schema {
        Schema::new().field(
            FieldSpec::string("email")
                .required()
                .email()
                .describe("Invitee email address"),
        )
    }

    fn credential_schema(&self) -> Schema {
        Schema::new().field(FieldSpec::string("api_token").required().non_empty())
    }

    async fn run(
        &self,
        args: &Validated,
        creds: &Credentials,
        _cx: &SessionContext,
    ) -> Result<ActionResult, ConnectorError> {
        let email = args.req_str("email");

        let raw = self
            .connector
            .call("meetings.list", json!({ "email": email }), creds)
            .await?;

        let collection = raw
            .get("collection")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ConnectorError::UnexpectedShape("meetings.list response missing collection".into())
            })?;

        let meetings = collection
            .iter()
            .map(|m| {
                Ok(json!({
                    "name": upstream_field(m, "name")?,
                    "startTime": upstream_field(m, "start_time")?,
                    "status": upstream_field(m, "status")?,
                    "location": upstream_field(m, "location")?,
                }))
            })
            .collect::<Result<Vec<Value>, ConnectorError>>()?;

        let message = if meetings.is_empty() {
            "No upcoming meetings found."
        } else {
            "Upcoming meetings retrieved."
        };

        Ok(ActionResult::ok(
            json!({ "email": email, "upcomingMeetings": meetings }),
            message,
        ))
    }
}
