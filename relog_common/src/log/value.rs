//! Tagged value type stored in a [`LogTable`](super::table::LogTable).
//!
//! The serde representation carries an explicit type tag so that integer
//! and floating-point values stay distinguishable through JSON, and a
//! replayed log restores exactly the types that were captured.

use serde::{Deserialize, Serialize};

/// A single typed log entry.
///
/// Scalar variants hold one value; array variants hold a fixed-length
/// snapshot copied from the producer at `put` time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LogValue {
    /// Boolean scalar.
    Boolean(bool),
    /// Integer scalar (widened to i64 in the log).
    Integer(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Text scalar.
    Text(String),
    /// Boolean array snapshot.
    BooleanArray(Vec<bool>),
    /// Integer array snapshot.
    IntegerArray(Vec<i64>),
    /// Floating-point array snapshot.
    FloatArray(Vec<f64>),
    /// Text array snapshot.
    TextArray(Vec<String>),
}

impl LogValue {
    /// Human-readable type name, for diagnostics only.
    pub fn kind(&self) -> &'static str {
        match self {
            LogValue::Boolean(_) => "boolean",
            LogValue::Integer(_) => "integer",
            LogValue::Float(_) => "float",
            LogValue::Text(_) => "text",
            LogValue::BooleanArray(_) => "boolean[]",
            LogValue::IntegerArray(_) => "integer[]",
            LogValue::FloatArray(_) => "float[]",
            LogValue::TextArray(_) => "text[]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(LogValue::Boolean(true).kind(), "boolean");
        assert_eq!(LogValue::Integer(7).kind(), "integer");
        assert_eq!(LogValue::FloatArray(vec![1.0]).kind(), "float[]");
    }

    #[test]
    fn tagged_json_keeps_numeric_types_apart() {
        let int = serde_json::to_string(&LogValue::Integer(3)).unwrap();
        let float = serde_json::to_string(&LogValue::Float(3.0)).unwrap();
        assert_ne!(int, float);

        let back: LogValue = serde_json::from_str(&int).unwrap();
        assert_eq!(back, LogValue::Integer(3));
        let back: LogValue = serde_json::from_str(&float).unwrap();
        assert_eq!(back, LogValue::Float(3.0));
    }
}
