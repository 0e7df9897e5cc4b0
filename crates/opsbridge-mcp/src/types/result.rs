//! The uniform action result envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use opsbridge::ConnectorError;

/// Field-keyed validation messages, one or more per invalid field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The one shape every action invocation resolves to.
///
/// `success: true` with null or empty `data` is a legitimate outcome — "no
/// error" and "non-empty result" are different statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub data: Value,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ActionResult {
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: message.into(),
            errors: None,
        }
    }

    pub fn invalid_arguments(errors: FieldErrors) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: "Invalid arguments.".to_string(),
            errors: Some(errors),
        }
    }

    pub fn invalid_auth(errors: FieldErrors) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: "Invalid auth information.".to_string(),
            errors: Some(errors),
        }
    }

    /// Normalize an upstream failure. Each taxonomy class keeps its own
    /// message so callers can branch on connectivity versus business
    /// rejection.
    pub fn upstream_failure(err: &ConnectorError) -> Self {
        Self::failure(err.to_string())
    }
}
