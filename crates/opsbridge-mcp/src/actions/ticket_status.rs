//! Action: ticket_status — look up the current state of a ticket.
//!
//! Not-found policy: failure. Asking after a nonexistent ticket id is treated
//! as a failed precondition, so the envelope is `success: false`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use opsbridge::{Connector, ConnectorError, Credentials};

use crate::schema::{FieldSpec, Schema, Validated};
use crate::session::SessionContext;
use crate::types::{ActionDefinition, ActionResult};

use super::{upstream_field, ActionHandler};

pub const NAME: &str = "ticket_status";

pub struct TicketStatus {
    connector: Arc<dyn Connector>,
}

impl TicketStatus {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ActionHandler for TicketStatus {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: NAME.to_string(),
            description: Some("Fetch the status of an existing support ticket".to_string()),
            input_schema: self.argument_schema().to_json_schema(),
        }
    }

    fn argument_schema(&self) -> Schema {
        Schema::new().field(
            FieldSpec::integer("ticket_id")
                .required()
                .describe("Numeric id of the ticket"),
        )
    }

    fn credential_schema(&self) -> Schema {
        Schema::new()
            .field(FieldSpec::string("subdomain").required().non_empty())
            .field(FieldSpec::string("email").required().email())
            .field(FieldSpec::string("api_token").required().non_empty())
    }

    async fn run(
        &self,
        args: &Validated,
        creds: &Credentials,
        _cx: &SessionContext,
    ) -> Result<ActionResult, ConnectorError> {
        let ticket_id = args.u64("ticket_id").unwrap_or_default();

        let raw = match self
            .connector
            .call("tickets.get", json!({ "ticket_id": ticket_id }), creds)
            .await
        {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                return Ok(ActionResult::failure(format!(
                    "Ticket not found: no ticket with id {ticket_id}."
                )));
            }
            Err(e) => return Err(e),
        };

        let data = json!({
            "ticketId": upstream_field(&raw, "id")?,
            "subject": upstream_field(&raw, "subject")?,
            "status": upstream_field(&raw, "status")?,
            "priority": upstream_field(&raw, "priority")?,
            "assignee": upstream_field(&raw, "assignee")?,
            "updatedAt": upstream_field(&raw, "updated_at")?,
        });

        Ok(ActionResult::ok(data, "Ticket status retrieved."))
    }
}
