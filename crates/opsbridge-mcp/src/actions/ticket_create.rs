//! Action: ticket_create — file a new support ticket.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use opsbridge::{Connector, ConnectorError, Credentials};

use crate::schema::{FieldSpec, Schema, Validated};
use crate::session::SessionContext;
use crate::types::{ActionDefinition, ActionResult};

use super::{upstream_field, ActionHandler};

pub const NAME: &str = "ticket_create";

pub struct TicketCreate {
    connector: Arc<dyn Connector>,
}

impl TicketCreate {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ActionHandler for TicketCreate {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: NAME.to_string(),
            description: Some("Create a support ticket in the helpdesk".to_string()),
            input_schema: self.argument_schema().to_json_schema(),
        }
    }

    fn argument_schema(&self) -> Schema {
        Schema::new()
            .field(
                FieldSpec::string("subject")
                    .required()
                    .non_empty()
                    .describe("Short summary of the issue"),
            )
            .field(
                FieldSpec::string("description")
                    .required()
                    .non_empty()
                    .describe("Full description of the issue"),
            )
            .field(
                FieldSpec::string("priority")
                    .one_of(vec!["low", "normal", "high", "urgent"])
                    .describe("Ticket priority (defaults to normal)"),
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
        let params = json!({
            "subject": args.req_str("subject"),
            "description": args.req_str("description"),
            "priority": args.str("priority").unwrap_or("normal"),
        });

        let raw = self.connector.call("tickets.create", params, creds).await?;

        let data = json!({
            "ticketId": upstream_field(&raw, "id")?,
            "subject": upstream_field(&raw, "subject")?,
            "status": upstream_field(&raw, "status")?,
            "priority": upstream_field(&raw, "priority")?,
            "createdAt": upstream_field(&raw, "created_at")?,
        });

        Ok(ActionResult::ok(data, "Support ticket created."))
    }
}
