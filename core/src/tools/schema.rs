//! Typed parameter schemas and validated tool arguments
//!
//! Models only loosely honour the schemas they are given, so every tool call
//! is checked against its declared [`ParameterSchema`] before the tool runs.
//! Tools receive [`ToolArguments`], never raw JSON.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Primitive type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl ParameterKind {
    /// JSON schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Integer => "integer",
            ParameterKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name as the model must send it
    pub name: String,
    /// Expected value type
    pub kind: ParameterKind,
    /// Human-readable description advertised to the model
    pub description: String,
    /// Allowed values for string parameters
    pub allowed: Option<Vec<String>>,
    /// Whether the parameter must be present
    pub required: bool,
}

/// Declared parameters of a tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Create an empty schema (a tool without parameters)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter
    pub fn required<N: Into<String>, D: Into<String>>(
        self,
        name: N,
        kind: ParameterKind,
        description: D,
    ) -> Self {
        self.push(name.into(), kind, description.into(), None, true)
    }

    /// Add an optional parameter
    pub fn optional<N: Into<String>, D: Into<String>>(
        self,
        name: N,
        kind: ParameterKind,
        description: D,
    ) -> Self {
        self.push(name.into(), kind, description.into(), None, false)
    }

    /// Add a required string parameter restricted to the given values
    pub fn required_enum<N, D, I, S>(self, name: N, description: D, values: I) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = values.into_iter().map(Into::into).collect();
        self.push(
            name.into(),
            ParameterKind::String,
            description.into(),
            Some(allowed),
            true,
        )
    }

    /// Add an optional string parameter restricted to the given values
    pub fn optional_enum<N, D, I, S>(self, name: N, description: D, values: I) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = values.into_iter().map(Into::into).collect();
        self.push(
            name.into(),
            ParameterKind::String,
            description.into(),
            Some(allowed),
            false,
        )
    }

    fn push(
        mut self,
        name: String,
        kind: ParameterKind,
        description: String,
        allowed: Option<Vec<String>>,
        required: bool,
    ) -> Self {
        // Redeclaring a name replaces the earlier declaration
        self.params.retain(|p| p.name != name);
        self.params.push(ParameterSpec {
            name,
            kind,
            description,
            allowed,
            required,
        });
        self
    }

    /// All declared parameters in declaration order
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Look up a declared parameter
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Render the JSON schema advertised to the model
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut property = json!({
                "type": param.kind.as_str(),
                "description": param.description,
            });
            if let Some(allowed) = &param.allowed {
                property["enum"] = json!(allowed);
            }
            properties.insert(param.name.clone(), property);

            if param.required {
                required.push(param.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check raw model-supplied arguments against the schema
    pub fn validate(&self, raw: &Value) -> Result<ToolArguments, ToolError> {
        let object = match raw {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                _ => return Err(invalid("arguments must be a JSON object")),
            },
            other => {
                return Err(invalid(format!(
                    "arguments must be a JSON object, got {}",
                    json_type_name(other)
                )))
            }
        };

        if let Some(unknown) = object.keys().find(|key| self.get(key).is_none()) {
            return Err(invalid(format!("unknown parameter '{}'", unknown)));
        }

        let mut arguments = ToolArguments::new();
        for param in &self.params {
            match object.get(&param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(invalid(format!(
                            "missing required parameter '{}'",
                            param.name
                        )));
                    }
                }
                Some(value) => {
                    let converted = convert(param, value)?;
                    arguments.values.insert(param.name.clone(), converted);
                }
            }
        }

        Ok(arguments)
    }
}

fn convert(param: &ParameterSpec, value: &Value) -> Result<ParameterValue, ToolError> {
    let mismatch = || {
        invalid(format!(
            "parameter '{}' must be a {}, got {}",
            param.name,
            param.kind,
            json_type_name(value)
        ))
    };

    match param.kind {
        ParameterKind::String => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if let Some(allowed) = &param.allowed {
                if !allowed.iter().any(|a| a == text) {
                    return Err(invalid(format!(
                        "parameter '{}' must be one of: {} (got '{}')",
                        param.name,
                        allowed.join(", "),
                        text
                    )));
                }
            }
            Ok(ParameterValue::String(text.to_string()))
        }
        ParameterKind::Number => value
            .as_f64()
            .map(ParameterValue::Number)
            .ok_or_else(mismatch),
        ParameterKind::Integer => value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(ParameterValue::Integer)
            .ok_or_else(mismatch),
        ParameterKind::Boolean => value
            .as_bool()
            .map(ParameterValue::Boolean)
            .ok_or_else(mismatch),
    }
}

fn invalid<S: Into<String>>(message: S) -> ToolError {
    ToolError::InvalidArguments {
        message: message.into(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A validated argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

/// Validated arguments handed to [`crate::tools::Tool::execute`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolArguments {
    values: BTreeMap<String, ParameterValue>,
}

impl ToolArguments {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (mainly for tests and direct invocation)
    pub fn with<N: Into<String>>(mut self, name: N, value: ParameterValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Get a value by name
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Get a string value by name
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParameterValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get a numeric value by name (integers widen to f64)
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(ParameterValue::Number(n)) => Some(*n),
            Some(ParameterValue::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get an integer value by name
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParameterValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get a boolean value by name
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ParameterValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Get a string value that the schema declared as required
    pub fn require_str(&self, name: &str) -> Result<&str, ToolError> {
        self.get_str(name)
            .ok_or_else(|| invalid(format!("missing string parameter '{}'", name)))
    }

    /// Number of provided values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values were provided
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over provided values in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme_schema() -> ParameterSchema {
        ParameterSchema::new().required_enum(
            "theme",
            "The theme to change to",
            ["light", "dark"],
        )
    }

    #[test]
    fn test_to_json_shape() {
        let schema = theme_schema().optional("count", ParameterKind::Integer, "How many");
        let json = schema.to_json();

        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["theme"]["type"], "string");
        assert_eq!(json["properties"]["theme"]["enum"], json!(["light", "dark"]));
        assert_eq!(json["properties"]["count"]["type"], "integer");
        assert!(json["properties"]["count"].get("enum").is_none());
        assert_eq!(json["required"], json!(["theme"]));
    }

    #[test]
    fn test_empty_schema_renders_empty_properties() {
        let json = ParameterSchema::new().to_json();
        assert_eq!(json["properties"], json!({}));
        assert_eq!(json["required"], json!([]));
    }

    #[test]
    fn test_validate_accepts_enum_member() {
        let args = theme_schema().validate(&json!({"theme": "dark"})).unwrap();
        assert_eq!(args.get_str("theme"), Some("dark"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_validate_rejects_value_outside_enum() {
        let err = theme_schema()
            .validate(&json!({"theme": "purple"}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("must be one of: light, dark"));
        assert!(message.contains("purple"));
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let err = theme_schema().validate(&json!({})).unwrap_err();
        assert!(err.to_string().contains("missing required parameter 'theme'"));
    }

    #[test]
    fn test_validate_rejects_unknown_parameter() {
        let err = theme_schema()
            .validate(&json!({"theme": "dark", "colour": "red"}))
            .unwrap_err();
        assert!(err.to_string().contains("unknown parameter 'colour'"));
    }

    #[test]
    fn test_validate_rejects_type_mismatch() {
        let schema = ParameterSchema::new()
            .required("count", ParameterKind::Integer, "n")
            .optional("verbose", ParameterKind::Boolean, "v");

        let err = schema.validate(&json!({"count": "three"})).unwrap_err();
        assert!(err.to_string().contains("must be a integer, got string"));

        let err = schema.validate(&json!({"count": 2.5})).unwrap_err();
        assert!(err.to_string().contains("'count'"));

        let err = schema
            .validate(&json!({"count": 1, "verbose": "yes"}))
            .unwrap_err();
        assert!(err.to_string().contains("'verbose'"));
    }

    #[test]
    fn test_validate_coerces_integral_float_to_integer() {
        let schema = ParameterSchema::new().required("count", ParameterKind::Integer, "n");
        let args = schema.validate(&json!({"count": 3.0})).unwrap();
        assert_eq!(args.get_i64("count"), Some(3));
        assert_eq!(args.get_f64("count"), Some(3.0));
    }

    #[test]
    fn test_validate_null_and_string_arguments() {
        let empty = ParameterSchema::new();
        assert!(empty.validate(&Value::Null).unwrap().is_empty());

        let args = theme_schema()
            .validate(&json!("{\"theme\":\"light\"}"))
            .unwrap();
        assert_eq!(args.get_str("theme"), Some("light"));

        assert!(theme_schema().validate(&json!("not json")).is_err());
        assert!(theme_schema().validate(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_optional_null_is_treated_as_absent() {
        let schema = ParameterSchema::new().optional("note", ParameterKind::String, "n");
        let args = schema.validate(&json!({"note": null})).unwrap();
        assert!(args.get("note").is_none());
    }

    #[test]
    fn test_redeclared_parameter_replaces_previous() {
        let schema = ParameterSchema::new()
            .optional("x", ParameterKind::String, "first")
            .required("x", ParameterKind::Number, "second");
        assert_eq!(schema.params().len(), 1);
        assert_eq!(schema.get("x").unwrap().kind, ParameterKind::Number);
        assert!(schema.get("x").unwrap().required);
    }

    #[test]
    fn test_require_str() {
        let args = ToolArguments::new().with("level", ParameterValue::String("WARN".into()));
        assert_eq!(args.require_str("level").unwrap(), "WARN");
        assert!(args.require_str("service").is_err());
    }
}
