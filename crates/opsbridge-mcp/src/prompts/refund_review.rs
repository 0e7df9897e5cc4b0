//! Prompt: refund_review — guide for reviewing a charge before refunding.

use serde_json::Value;

use crate::types::{McpError, McpResult, PromptGetResult, PromptMessage, ToolContent};

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let charge_id = args
        .get("charge_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::InvalidParams("charge_id is required".to_string()))?;
    let reason = args.get("reason").and_then(|v| v.as_str()).unwrap_or("");

    let reason_section = if reason.is_empty() {
        String::new()
    } else {
        format!("\nRefund reason given: {reason}\n")
    };

    let text = format!(
        "A refund was requested for charge {charge_id}.\n\
         {reason_section}\n\
         Please:\n\
         1. Use invoice_fetch to check whether the charge's invoice is paid\n\
         2. Decide between a full refund (omit amount) or a partial one\n\
         3. Use refund_create with charge_id {charge_id} to issue it\n\
         4. Report the refund id and status back"
    );

    Ok(PromptGetResult {
        description: Some("Guide for reviewing a charge before issuing a refund".to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Text { text },
        }],
    })
}
