//! Action: refund_create — refund a charge, fully or partially.
//!
//! Not-found policy: failure. Refunding requires the charge to exist, so an
//! unknown charge id is a failed precondition.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use opsbridge::{Connector, ConnectorError, Credentials};

use crate::schema::{FieldSpec, Schema, Validated};
use crate::session::SessionContext;
use crate::types::{ActionDefinition, ActionResult};

use super::{upstream_field, ActionHandler};

pub const NAME: &str = "refund_create";

pub struct RefundCreate {
    connector: Arc<dyn Connector>,
}

impl RefundCreate {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ActionHandler for RefundCreate {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: NAME.to_string(),
            description: Some(
                "Issue a refund against a charge; omit amount for a full refund".to_string(),
            ),
            input_schema: self.argument_schema().to_json_schema(),
        }
    }

    fn argument_schema(&self) -> Schema {
        Schema::new()
            .field(
                FieldSpec::string("charge_id")
                    .required()
                    .non_empty()
                    .describe("Charge to refund, e.g. ch_123"),
            )
            .field(
                FieldSpec::integer("amount")
                    .positive()
                    .describe("Amount in minor units; defaults to the full charge"),
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
        let charge_id = args.req_str("charge_id");

        let mut params = json!({ "charge_id": charge_id });
        if let Some(amount) = args.i64("amount") {
            params["amount"] = amount.into();
        }

        let raw = match self.connector.call("refunds.create", params, creds).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                return Ok(ActionResult::failure(format!(
                    "Charge not found: no charge with id {charge_id}."
                )));
            }
            Err(e) => return Err(e),
        };

        let data = json!({
            "id": upstream_field(&raw, "id")?,
            "chargeId": upstream_field(&raw, "charge")?,
            "amount": upstream_field(&raw, "amount")?,
            "currency": upstream_field(&raw, "currency")?,
            "status": upstream_field(&raw, "status")?,
        });

        Ok(ActionResult::ok(data, "Refund succeeded."))
    }
}
