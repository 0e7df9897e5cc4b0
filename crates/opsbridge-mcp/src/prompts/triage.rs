//! Prompt: triage — guide for filing a well-formed support ticket.

use serde_json::Value;

use crate::types::{McpResult, PromptGetResult, PromptMessage, ToolContent};

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let issue = args.get("issue").and_then(|v| v.as_str()).unwrap_or("");

    let issue_section = if issue.is_empty() {
        String::new()
    } else {
        format!("\nReported issue: {issue}\n")
    };

    let text = format!(
        "I need to file a support ticket for a customer.\n\
         {issue_section}\n\
         Please:\n\
         1. Summarize the problem in one line for the `subject`\n\
         2. Write a `description` with steps to reproduce and impact\n\
         3. Pick a `priority` (low, normal, high, urgent) based on impact\n\
         4. Use ticket_create to file the ticket, then report the ticket id back"
    );

    Ok(PromptGetResult {
        description: Some("Guide for filing a well-formed support ticket".to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Text { text },
        }],
    })
}
