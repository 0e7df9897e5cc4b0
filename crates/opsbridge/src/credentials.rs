//! Validated credential bundle with redaction for diagnostics.

use std::collections::BTreeMap;

use serde_json::Value;

/// Maximum number of secret characters exposed by [`Credentials::redacted`].
const REDACT_PREFIX_LEN: usize = 4;

/// A validated set of credential fields for one upstream service.
///
/// Values are held as JSON so connectors stay schema-agnostic; accessors
/// return string views for the common case. Secrets must only ever reach logs
/// through [`Credentials::redacted`].
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    fields: BTreeMap<String, Value>,
}

impl Credentials {
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn from_object(value: &Value) -> Self {
        let fields = value
            .as_object()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Bounded-prefix view of a secret, safe for logs.
    ///
    /// Never returns the full value: secrets longer than the prefix show
    /// their first four characters and an ellipsis; anything shorter is
    /// fully masked.
    pub fn redacted(&self, key: &str) -> String {
        match self.get_str(key) {
            Some(s) if s.chars().count() > REDACT_PREFIX_LEN => {
                let prefix: String = s.chars().take(REDACT_PREFIX_LEN).collect();
                format!("{prefix}…")
            }
            Some(s) if !s.is_empty() => "<redacted>".to_string(),
            _ => "<unset>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redaction_never_leaks_full_secret() {
        let creds = Credentials::from_object(&json!({ "api_key": "sk_live_abcdef123456" }));
        let shown = creds.redacted("api_key");
        assert_eq!(shown, "sk_l…");
        assert!(!shown.contains("abcdef"));
    }

    #[test]
    fn redaction_handles_short_and_missing_values() {
        let creds = Credentials::from_object(&json!({ "token": "ab" }));
        assert_eq!(creds.redacted("token"), "<redacted>");
        assert_eq!(creds.redacted("nope"), "<unset>");
    }

    #[test]
    fn prefix_length_secrets_are_fully_masked() {
        // A secret exactly as long as the prefix must not be echoed at all.
        let creds = Credentials::from_object(&json!({ "token": "ab12" }));
        let shown = creds.redacted("token");
        assert_eq!(shown, "<redacted>");
        assert!(!shown.contains("ab12"));
    }

    #[test]
    fn non_object_input_yields_empty_bundle() {
        let creds = Credentials::from_object(&json!("not an object"));
        assert!(creds.is_empty());
    }
}
