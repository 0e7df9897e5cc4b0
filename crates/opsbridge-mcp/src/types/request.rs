//! Request parameter types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of a `tools/call` request. `arguments` and `auth` stay opaque
/// JSON until the target action's schemas have validated them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub auth: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequestParams {
    #[serde(rename = "requestId")]
    pub request_id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
