use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOperation {
    /// Overwrites the current value.
    Set,
    /// Adds to the current value; absent counts as zero.
    Increment,
    /// Scales the current value; absent yields zero.
    Multiply,
}

impl TransformOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Increment => "increment",
            Self::Multiply => "multiply",
        }
    }
}

impl fmt::Display for TransformOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformOperation {
    type Err = TransformError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "set" => Ok(Self::Set),
            "increment" => Ok(Self::Increment),
            "multiply" => Ok(Self::Multiply),
            other => Err(TransformError::UnknownOperation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    InvalidKey(String),
    UnknownOperation(String),
    NonFiniteValue { key: String, value: f64 },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "transform key '{key}' is not a symbol"),
            Self::UnknownOperation(op) => write!(f, "unknown transform operation '{op}'"),
            Self::NonFiniteValue { key, value } => {
                write!(f, "transform for '{key}' has non-finite value {value}")
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// True for ASCII identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_symbolic_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One validated edit to a named pipeline value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransform")]
pub struct PipelineTransform {
    key: String,
    value: f64,
    operation: TransformOperation,
}

#[derive(Deserialize)]
struct RawTransform {
    key: String,
    value: f64,
    operation: String,
}

impl TryFrom<RawTransform> for PipelineTransform {
    type Error = TransformError;

    fn try_from(raw: RawTransform) -> Result<Self, Self::Error> {
        PipelineTransform::parse(raw.key, raw.value, &raw.operation)
    }
}

impl PipelineTransform {
    pub fn new(
        key: impl Into<String>,
        value: f64,
        operation: TransformOperation,
    ) -> Result<Self, TransformError> {
        let key = key.into();
        if !is_symbolic_key(&key) {
            return Err(TransformError::InvalidKey(key));
        }
        if !value.is_finite() {
            return Err(TransformError::NonFiniteValue { key, value });
        }
        Ok(Self {
            key,
            value,
            operation,
        })
    }

    pub fn parse(key: impl Into<String>, value: f64, operation: &str) -> Result<Self, TransformError> {
        let operation = operation.parse::<TransformOperation>()?;
        Self::new(key, value, operation)
    }

    pub fn set(key: impl Into<String>, value: f64) -> Result<Self, TransformError> {
        Self::new(key, value, TransformOperation::Set)
    }

    pub fn increment(key: impl Into<String>, value: f64) -> Result<Self, TransformError> {
        Self::new(key, value, TransformOperation::Increment)
    }

    pub fn multiply(key: impl Into<String>, value: f64) -> Result<Self, TransformError> {
        Self::new(key, value, TransformOperation::Multiply)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn operation(&self) -> TransformOperation {
        self.operation
    }

    pub fn is_multiplicative(&self) -> bool {
        self.operation == TransformOperation::Multiply
    }

    /// A multiplier with nothing to scale produces 0, not the multiplier itself.
    pub fn apply(&self, current: Option<f64>) -> f64 {
        match self.operation {
            TransformOperation::Set => self.value,
            TransformOperation::Increment => current.unwrap_or(0.0) + self.value,
            TransformOperation::Multiply => match current {
                Some(current) => current * self.value,
                None => 0.0,
            },
        }
    }
}

impl fmt::Display for PipelineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operation, self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_keys() {
        assert!(is_symbolic_key("angle_deg"));
        assert!(is_symbolic_key("_private2"));
        assert!(!is_symbolic_key(""));
        assert!(!is_symbolic_key("2fast"));
        assert!(!is_symbolic_key("angle deg"));
        assert!(!is_symbolic_key("angle-deg"));
    }

    #[test]
    fn deserialization_validates_eagerly() {
        let ok: PipelineTransform =
            serde_json::from_str(r#"{"key":"angle_deg","value":3.0,"operation":"increment"}"#)
                .unwrap();
        assert_eq!(ok.operation(), TransformOperation::Increment);

        let bad = serde_json::from_str::<PipelineTransform>(
            r#"{"key":"angle_deg","value":3.0,"operation":"divide"}"#,
        );
        assert!(bad.is_err());
    }
}
