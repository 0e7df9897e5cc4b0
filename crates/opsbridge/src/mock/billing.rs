//! Mock billing connector (invoices, refunds, report export).

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connector::Connector;
use crate::credentials::Credentials;
use crate::error::{ConnectorError, ConnectorResult};

/// API key value that simulates an unreachable billing service.
pub const UNREACHABLE_KEY: &str = "sk_unreachable";

/// Invoice id whose fixture response is deliberately malformed.
pub const MALFORMED_INVOICE: &str = "in_malformed";

/// Mock billing service with fixture charges and invoices.
pub struct MockBilling {
    next_refund: AtomicU64,
}

impl MockBilling {
    pub fn new() -> Self {
        Self {
            next_refund: AtomicU64::new(1),
        }
    }

    fn fixture_charge_amount(charge_id: &str) -> Option<i64> {
        match charge_id {
            "ch_123" => Some(500),
            "ch_789" => Some(12_000),
            _ => None,
        }
    }

    fn fixture_invoice(invoice_id: &str) -> Option<Value> {
        match invoice_id {
            "in_1001" => Some(json!({
                "id": "in_1001",
                "customer": "cus_42",
                "amount_due": 2400,
                "currency": "usd",
                "status": "paid",
                "hosted_url": "https://billing.example.test/invoices/in_1001"
            })),
            "in_1002" => Some(json!({
                "id": "in_1002",
                "customer": "cus_17",
                "amount_due": 990,
                "currency": "usd",
                "status": "open",
                "hosted_url": "https://billing.example.test/invoices/in_1002"
            })),
            _ => None,
        }
    }
}

impl Default for MockBilling {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MockBilling {
    fn service(&self) -> &str {
        "billing"
    }

    async fn call(
        &self,
        operation: &str,
        params: Value,
        creds: &Credentials,
    ) -> ConnectorResult<Value> {
        if creds.get_str("api_key") == Some(UNREACHABLE_KEY) {
            return Err(ConnectorError::NoResponse(
                "connection timed out after 30s".into(),
            ));
        }

        tracing::debug!(
            operation,
            key = %creds.redacted("api_key"),
            "billing mock call"
        );

        match operation {
            "invoices.get" => {
                let invoice_id = params
                    .get("invoice_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ConnectorError::UnexpectedShape("invoices.get requires invoice_id".into())
                    })?;
                if invoice_id == MALFORMED_INVOICE {
                    // Simulates contract drift: a bare string instead of an object.
                    return Ok(json!("unexpected payload"));
                }
                Self::fixture_invoice(invoice_id)
                    .ok_or_else(|| ConnectorError::not_found(format!("invoice {invoice_id}")))
            }
            "refunds.create" => {
                let charge_id = params
                    .get("charge_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ConnectorError::UnexpectedShape("refunds.create requires charge_id".into())
                    })?;
                let full = Self::fixture_charge_amount(charge_id)
                    .ok_or_else(|| ConnectorError::not_found(format!("charge {charge_id}")))?;
                let amount = params.get("amount").and_then(Value::as_i64).unwrap_or(full);
                if amount > full {
                    return Err(ConnectorError::Upstream {
                        status: 422,
                        message: format!(
                            "refund amount {amount} exceeds charge amount {full}"
                        ),
                    });
                }
                let n = self.next_refund.fetch_add(1, Ordering::Relaxed);
                Ok(json!({
                    "id": format!("re_{n}"),
                    "charge": charge_id,
                    "amount": amount,
                    "currency": "usd",
                    "status": "succeeded"
                }))
            }
            "reports.export" => {
                let rows = params.get("steps").and_then(Value::as_u64).unwrap_or(0);
                Ok(json!({
                    "report_id": format!("rpt_{}", uuid::Uuid::new_v4().simple()),
                    "status": "complete",
                    "rows": rows,
                    "generated_at": chrono::Utc::now().to_rfc3339()
                }))
            }
            other => Err(ConnectorError::UnexpectedShape(format!(
                "billing does not support operation '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn creds() -> Credentials {
        Credentials::from_object(&json!({ "api_key": "sk_test_abc" }))
    }

    #[tokio::test]
    async fn refund_defaults_to_full_charge_amount() {
        let billing = MockBilling::new();
        let refund = billing
            .call("refunds.create", json!({ "charge_id": "ch_123" }), &creds())
            .await
            .unwrap();
        assert_eq!(refund["id"], "re_1");
        assert_eq!(refund["amount"], 500);
        assert_eq!(refund["status"], "succeeded");
    }

    #[tokio::test]
    async fn over_refund_is_rejected_with_error_payload() {
        let billing = MockBilling::new();
        let err = billing
            .call(
                "refunds.create",
                json!({ "charge_id": "ch_123", "amount": 9999 }),
                &creds(),
            )
            .await
            .unwrap_err();
        match err {
            ConnectorError::Upstream { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("exceeds"));
            }
            other => panic!("expected Upstream 422, got {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_key_simulates_no_response() {
        let billing = MockBilling::new();
        let creds = Credentials::from_object(&json!({ "api_key": UNREACHABLE_KEY }));
        let err = billing
            .call("invoices.get", json!({ "invoice_id": "in_1001" }), &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::NoResponse(_)));
    }
}
