//! Action: invoice_fetch — retrieve one invoice.
//!
//! Not-found policy: success with null data. A read that matches nothing is
//! an answered question, so the envelope is `success: true` with
//! `data.invoice = null`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use opsbridge::{Connector, ConnectorError, Credentials};

use crate::schema::{FieldSpec, Schema, Validated};
use crate::session::SessionContext;
use crate::types::{ActionDefinition, ActionResult};

use super::{upstream_field, ActionHandler};

pub const NAME: &str = "invoice_fetch";

pub struct InvoiceFetch {
    connector: Arc<dyn Connector>,
}

impl InvoiceFetch {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ActionHandler for InvoiceFetch {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: NAME.to_string(),
            description: Some("Fetch an invoice from the billing service".to_string()),
            input_schema: self.argument_schema().to_json_schema(),
        }
    }

    fn argument_schema(&self) -> Schema {
        Schema::new().field(
            FieldSpec::string("invoice_id")
                .required()
                .non_empty()
                .describe("Billing invoice id, e.g. in_1001"),
        )
    }

    fn credential_schema(&self) -> Schema {
        Schema::new().field(FieldSpec::string("api_key").required().non_empty())
    }

    async fn run(
        &self,
        args: &Validated,
        creds: &Credentials,
        _cx: &SessionContext,
    ) -> Result<ActionResult, ConnectorError> {
        let invoice_id = args.req_str("invoice_id");

        let raw = match self
            .connector
            .call("invoices.get", json!({ "invoice_id": invoice_id }), creds)
            .await
        {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                return Ok(ActionResult::ok(
                    json!({ "invoice": null }),
                    format!("No invoice matched id {invoice_id}."),
                ));
            }
            Err(e) => return Err(e),
        };

        if !raw.is_object() {
            return Err(ConnectorError::UnexpectedShape(
                "invoices.get returned a non-object payload".into(),
            ));
        }

        let data = json!({
            "invoice": {
                "id": upstream_field(&raw, "id")?,
                "customer": upstream_field(&raw, "customer")?,
                "amountDue": upstream_field(&raw, "amount_due")?,
                "currency": upstream_field(&raw, "currency")?,
                "status": upstream_field(&raw, "status")?,
                "hostedUrl": upstream_field(&raw, "hosted_url")?,
            }
        });

        Ok(ActionResult::ok(data, "Invoice retrieved."))
    }
}
