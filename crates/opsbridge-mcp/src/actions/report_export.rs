//! Action: report_export — long-running billing report export with progress
//! notifications before the terminal result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use opsbridge::{Connector, ConnectorError, Credentials};

use crate::schema::{FieldSpec, Schema, Validated};
use crate::session::{NotificationStreamer, SessionContext};
use crate::types::{ActionDefinition, ActionResult};

use super::{upstream_field, ActionHandler};

pub const NAME: &str = "report_export";

const DEFAULT_STEPS: u32 = 5;
const DEFAULT_INTERVAL_MS: u64 = 250;

pub struct ReportExport {
    connector: Arc<dyn Connector>,
}

impl ReportExport {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ActionHandler for ReportExport {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition {
            name: NAME.to_string(),
            description: Some(
                "Export a billing report; emits one progress notification per step".to_string(),
            ),
            input_schema: self.argument_schema().to_json_schema(),
        }
    }

    fn argument_schema(&self) -> Schema {
        Schema::new()
            .field(
                FieldSpec::integer("steps")
                    .int_range(1, 50)
                    .describe("Number of progress notifications to emit"),
            )
            .field(
                FieldSpec::integer("interval_ms")
                    .int_range(50, 5000)
                    .describe("Delay between progress notifications, in milliseconds"),
            )
    }

    fn credential_schema(&self) -> Schema {
        Schema::new().field(FieldSpec::string("api_key").required().non_empty())
    }

    async fn run(
        &self,
        args: &Validated,
        creds: &Credentials,
        cx: &SessionContext,
    ) -> Result<ActionResult, ConnectorError> {
        let steps = args.u64("steps").map(|n| n as u32).unwrap_or(DEFAULT_STEPS);
        let interval =
            Duration::from_millis(args.u64("interval_ms").unwrap_or(DEFAULT_INTERVAL_MS));

        let streamer = NotificationStreamer::new(steps, interval);
        let emitted = streamer.stream(cx, "Report export").await;

        // The upstream call proceeds even after a disconnect; the session
        // discards the result rather than cancelling the call.
        let raw = self
            .connector
            .call("reports.export", json!({ "steps": steps }), creds)
            .await?;

        let data = json!({
            "reportId": upstream_field(&raw, "report_id")?,
            "status": upstream_field(&raw, "status")?,
            "rows": upstream_field(&raw, "rows")?,
            "generatedAt": upstream_field(&raw, "generated_at")?,
            "notificationsEmitted": emitted,
        });

        Ok(ActionResult::ok(data, "Report export complete."))
    }
}
