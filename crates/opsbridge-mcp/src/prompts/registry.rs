//! Prompt registration and dispatch.

use serde_json::Value;

use crate::types::{McpError, McpResult, PromptArgument, PromptDefinition, PromptGetResult};

use super::{refund_review, triage};

pub struct PromptRegistry;

impl PromptRegistry {
    pub fn list_prompts() -> Vec<PromptDefinition> {
        vec![
            PromptDefinition {
                name: "triage".to_string(),
                description: Some("Guide for filing a well-formed support ticket".to_string()),
                arguments: Some(vec![PromptArgument {
                    name: "issue".to_string(),
                    description: Some("Short description of the customer's problem".to_string()),
                    required: false,
                }]),
            },
            PromptDefinition {
                name: "refund_review".to_string(),
                description: Some(
                    "Guide for reviewing a charge before issuing a refund".to_string(),
                ),
                arguments: Some(vec![
                    PromptArgument {
                        name: "charge_id".to_string(),
                        description: Some("Charge under review".to_string()),
                        required: true,
                    },
                    PromptArgument {
                        name: "reason".to_string(),
                        description: Some("Why the refund was requested".to_string()),
                        required: false,
                    },
                ]),
            },
        ]
    }

    pub async fn get(name: &str, arguments: Option<Value>) -> McpResult<PromptGetResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "triage" => triage::expand(args),
            "refund_review" => refund_review::expand(args),
            _ => Err(McpError::PromptNotFound(name.to_string())),
        }
    }
}
