use thiserror::Error;

/// Model output that parsed as JSON but violates the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("expected {expected}, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("expected at least one item")]
    Empty,

    #[error("item {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Short JSON type name for error messages.
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
