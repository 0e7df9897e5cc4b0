//! Action handler implementations.
//!
//! Every action pairs an argument schema and a credential schema with an
//! execution function against one upstream connector. The uniform
//! validate-then-execute pipeline lives in [`dispatch`]; each action module
//! only contributes schemas, the connector call, and the field mapping of its
//! upstream payload.

pub mod dispatch;
pub mod invoice_fetch;
pub mod meetings_lookup;
pub mod refund_create;
pub mod registry;
pub mod report_export;
pub mod ticket_create;
pub mod ticket_status;

use async_trait::async_trait;
use serde_json::Value;

use opsbridge::{ConnectorError, Credentials};

use crate::schema::{Schema, Validated};
use crate::session::SessionContext;
use crate::types::{ActionDefinition, ActionResult};

pub use registry::ActionRegistry;

/// One named action: declared input shapes plus an execution function.
///
/// `run` receives values that already passed both schema gates. It returns
/// `Ok` for any protocol-well-formed outcome (including soft failures like
/// "ticket not found") and `Err` only for upstream faults, which the dispatch
/// pipeline normalizes into the failure envelope.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn definition(&self) -> ActionDefinition;

    fn argument_schema(&self) -> Schema;

    fn credential_schema(&self) -> Schema;

    async fn run(
        &self,
        args: &Validated,
        creds: &Credentials,
        cx: &SessionContext,
    ) -> Result<ActionResult, ConnectorError>;
}

/// Pull a field out of an upstream payload, treating absence as contract
/// drift rather than silently emitting nulls.
pub(crate) fn upstream_field(raw: &Value, key: &str) -> Result<Value, ConnectorError> {
    raw.get(key)
        .cloned()
        .ok_or_else(|| ConnectorError::UnexpectedShape(format!("response missing field `{key}`")))
}
