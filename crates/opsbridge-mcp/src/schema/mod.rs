//! Declarative argument/credential schemas and their validator.
//!
//! A [`Schema`] is a flat list of typed, constrained fields. Validation is
//! pure: it either returns a [`Validated`] value with typed accessors or a
//! field-keyed map of human-readable messages, and it never touches anything
//! outside its input. The same schema also renders itself as JSON Schema for
//! capability advertisement.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::types::FieldErrors;

/// Synthetic field key used when the input as a whole is malformed.
pub const ROOT_KEY: &str = "_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    fn json_name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Clone)]
enum Constraint {
    NonEmpty,
    Email,
    OneOf(Vec<&'static str>),
    IntRange { min: i64, max: i64 },
    Positive,
}

impl Constraint {
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Constraint::NonEmpty => match value.as_str() {
                Some(s) if s.trim().is_empty() => Some("must not be empty".to_string()),
                _ => None,
            },
            Constraint::Email => match value.as_str() {
                Some(s) if !is_plausible_email(s) => {
                    Some("must be a valid email address".to_string())
                }
                _ => None,
            },
            Constraint::OneOf(allowed) => match value.as_str() {
                Some(s) if !allowed.contains(&s) => {
                    Some(format!("must be one of: {}", allowed.join(", ")))
                }
                _ => None,
            },
            Constraint::IntRange { min, max } => {
                // Compare through i128 so integers above i64::MAX are still
                // range-checked instead of silently skipped.
                let n = value
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| value.as_u64().map(i128::from));
                match n {
                    Some(n) if n < i128::from(*min) || n > i128::from(*max) => {
                        Some(format!("must be between {min} and {max}"))
                    }
                    _ => None,
                }
            }
            Constraint::Positive => match value.as_f64() {
                Some(n) if n <= 0.0 => Some("must be a positive number".to_string()),
                _ => None,
            },
        }
    }
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    ty: FieldType,
    required: bool,
    description: Option<&'static str>,
    constraints: Vec<Constraint>,
}

impl FieldSpec {
    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            description: None,
            constraints: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.constraints.push(Constraint::NonEmpty);
        self
    }

    pub fn email(mut self) -> Self {
        self.constraints.push(Constraint::Email);
        self
    }

    pub fn one_of(mut self, allowed: Vec<&'static str>) -> Self {
        self.constraints.push(Constraint::OneOf(allowed));
        self
    }

    pub fn int_range(mut self, min: i64, max: i64) -> Self {
        self.constraints.push(Constraint::IntRange { min, max });
        self
    }

    pub fn positive(mut self) -> Self {
        self.constraints.push(Constraint::Positive);
        self
    }
}

/// A declared input shape: required/optional fields with constraints.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Validate a raw JSON value. Unknown fields are ignored; `null` counts
    /// as absent. All invalid fields are reported, not just the first.
    pub fn validate(&self, value: &Value) -> Result<Validated, FieldErrors> {
        let object = match value {
            Value::Null => Map::new(),
            Value::Object(m) => m.clone(),
            _ => {
                let mut errors = BTreeMap::new();
                errors.insert(ROOT_KEY.to_string(), vec!["expected an object".to_string()]);
                return Err(errors);
            }
        };

        let mut errors: FieldErrors = BTreeMap::new();
        let mut out = Map::new();

        for spec in &self.fields {
            let entry = object.get(spec.name).filter(|v| !v.is_null());
            match entry {
                None => {
                    if spec.required {
                        errors
                            .entry(spec.name.to_string())
                            .or_default()
                            .push("is required".to_string());
                    }
                }
                Some(v) => {
                    if !spec.ty.matches(v) {
                        errors
                            .entry(spec.name.to_string())
                            .or_default()
                            .push(format!("must be a {}", spec.ty.json_name()));
                        continue;
                    }
                    let mut ok = true;
                    for constraint in &spec.constraints {
                        if let Some(msg) = constraint.check(v) {
                            errors.entry(spec.name.to_string()).or_default().push(msg);
                            ok = false;
                        }
                    }
                    if ok {
                        out.insert(spec.name.to_string(), v.clone());
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(Validated { fields: out })
        } else {
            Err(errors)
        }
    }

    /// Render the schema as JSON Schema for `tools/list` advertisement.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(spec.ty.json_name()));
            if let Some(desc) = spec.description {
                prop.insert("description".to_string(), json!(desc));
            }
            for constraint in &spec.constraints {
                match constraint {
                    Constraint::OneOf(allowed) => {
                        prop.insert("enum".to_string(), json!(allowed));
                    }
                    Constraint::Email => {
                        prop.insert("format".to_string(), json!("email"));
                    }
                    Constraint::IntRange { min, max } => {
                        prop.insert("minimum".to_string(), json!(min));
                        prop.insert("maximum".to_string(), json!(max));
                    }
                    Constraint::NonEmpty => {
                        prop.insert("minLength".to_string(), json!(1));
                    }
                    Constraint::Positive => {
                        prop.insert("exclusiveMinimum".to_string(), json!(0));
                    }
                }
            }
            properties.insert(spec.name.to_string(), Value::Object(prop));
            if spec.required {
                required.push(spec.name);
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

/// A value that passed schema validation, with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    fields: Map<String, Value>,
}

impl Validated {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Accessor for a field the schema declared required. The schema gate
    /// guarantees presence, so absence here is a programming error.
    pub fn req_str(&self, name: &str) -> &str {
        self.str(name).unwrap_or_default()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        self.fields.get(name).and_then(Value::as_u64)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Structural email check: non-empty local part, dotted non-empty domain.
fn is_plausible_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket_schema() -> Schema {
        Schema::new()
            .field(FieldSpec::string("subject").required().non_empty())
            .field(FieldSpec::string("description").required().non_empty())
            .field(
                FieldSpec::string("priority")
                    .one_of(vec!["low", "normal", "high", "urgent"]),
            )
    }

    #[test]
    fn valid_input_passes_with_typed_access() {
        let v = ticket_schema()
            .validate(&json!({
                "subject": "Printer on fire",
                "description": "Smoke everywhere",
                "priority": "urgent"
            }))
            .unwrap();
        assert_eq!(v.req_str("subject"), "Printer on fire");
        assert_eq!(v.str("priority"), Some("urgent"));
    }

    #[test]
    fn all_invalid_fields_are_reported_at_once() {
        let errors = ticket_schema()
            .validate(&json!({ "subject": "  ", "priority": "asap" }))
            .unwrap_err();
        assert!(errors["subject"][0].contains("empty"));
        assert!(errors["description"][0].contains("required"));
        assert!(errors["priority"][0].contains("one of"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn null_is_treated_as_absent() {
        let schema = Schema::new().field(FieldSpec::string("note"));
        assert!(schema.validate(&json!({ "note": null })).is_ok());
        assert!(schema.validate(&Value::Null).is_ok());
    }

    #[test]
    fn non_object_input_reports_under_root_key() {
        let errors = ticket_schema().validate(&json!("nope")).unwrap_err();
        assert_eq!(errors[ROOT_KEY][0], "expected an object");
    }

    #[test]
    fn type_mismatch_skips_constraint_checks() {
        let schema = Schema::new().field(FieldSpec::integer("steps").int_range(1, 50));
        let errors = schema.validate(&json!({ "steps": "five" })).unwrap_err();
        assert_eq!(errors["steps"], vec!["must be a integer".to_string()]);
    }

    #[test]
    fn int_range_and_positive_constraints() {
        let schema = Schema::new()
            .field(FieldSpec::integer("steps").int_range(1, 50))
            .field(FieldSpec::number("amount").positive());
        let errors = schema
            .validate(&json!({ "steps": 99, "amount": -3 }))
            .unwrap_err();
        assert!(errors["steps"][0].contains("between 1 and 50"));
        assert!(errors["amount"][0].contains("positive"));
    }

    #[test]
    fn integers_beyond_i64_are_still_range_checked() {
        let schema = Schema::new().field(FieldSpec::integer("steps").int_range(1, 50));
        let errors = schema
            .validate(&json!({ "steps": u64::MAX }))
            .unwrap_err();
        assert!(errors["steps"][0].contains("between 1 and 50"));
    }

    #[test]
    fn email_constraint() {
        let schema = Schema::new().field(FieldSpec::string("email").required().email());
        assert!(schema.validate(&json!({ "email": "a@b.co" })).is_ok());
        for bad in ["plain", "@b.co", "a@", "a@nodot", "a b@c.d", "a@.co"] {
            assert!(
                schema.validate(&json!({ "email": bad })).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn json_schema_rendering_includes_constraints() {
        let rendered = ticket_schema().to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["priority"]["enum"][0], "low");
        assert_eq!(rendered["required"], json!(["subject", "description"]));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let v = ticket_schema()
            .validate(&json!({
                "subject": "s",
                "description": "d",
                "extra": 42
            }))
            .unwrap();
        assert!(v.get("extra").is_none());
    }
}
