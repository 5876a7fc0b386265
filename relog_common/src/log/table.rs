//! Typed key-value record for one timestep of one adapter.
//!
//! `put_*` inserts or overwrites an entry; overwrite is always legal.
//! `get_*` is total: on a missing key, a type mismatch, or an array length
//! mismatch it returns the caller's default instead of failing. Mismatch is
//! treated as absence, not an error — renamed and removed fields degrade
//! gracefully when replaying logs written by an older schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::LogValue;

/// Ordered, typed key-value record written and read by
/// [`LoggableInputs`](super::inputs::LoggableInputs) implementations.
///
/// One instance exists per cycle per adapter namespace: created fresh on
/// capture, loaded from the persisted snapshot on replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogTable {
    entries: BTreeMap<String, LogValue>,
}

impl LogTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is present, regardless of its type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw entry access, for inspection and tooling.
    pub fn get(&self, key: &str) -> Option<&LogValue> {
        self.entries.get(key)
    }

    /// Remove an entry, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<LogValue> {
        self.entries.remove(key)
    }

    /// Iterate entries in deterministic (sorted-key) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LogValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ─── Writers ────────────────────────────────────────────────────

    /// Insert or overwrite a boolean entry.
    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.entries.insert(key.to_string(), LogValue::Boolean(value));
    }

    /// Insert or overwrite an integer entry.
    pub fn put_int(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), LogValue::Integer(value));
    }

    /// Insert or overwrite a floating-point entry.
    pub fn put_float(&mut self, key: &str, value: f64) {
        self.entries.insert(key.to_string(), LogValue::Float(value));
    }

    /// Insert or overwrite a text entry.
    pub fn put_text(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_string(), LogValue::Text(value.to_string()));
    }

    /// Insert or overwrite a boolean array entry. The slice is copied;
    /// later mutation by the caller never leaks into the log.
    pub fn put_bool_array(&mut self, key: &str, values: &[bool]) {
        self.entries
            .insert(key.to_string(), LogValue::BooleanArray(values.to_vec()));
    }

    /// Insert or overwrite an integer array entry (copied).
    pub fn put_int_array(&mut self, key: &str, values: &[i64]) {
        self.entries
            .insert(key.to_string(), LogValue::IntegerArray(values.to_vec()));
    }

    /// Insert or overwrite a floating-point array entry (copied).
    pub fn put_float_array(&mut self, key: &str, values: &[f64]) {
        self.entries
            .insert(key.to_string(), LogValue::FloatArray(values.to_vec()));
    }

    /// Insert or overwrite a text array entry (copied).
    pub fn put_text_array(&mut self, key: &str, values: &[String]) {
        self.entries
            .insert(key.to_string(), LogValue::TextArray(values.to_vec()));
    }

    // ─── Readers ────────────────────────────────────────────────────

    /// Stored boolean, or `default` on missing key / type mismatch.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(LogValue::Boolean(v)) => *v,
            _ => default,
        }
    }

    /// Stored integer, or `default` on missing key / type mismatch.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.entries.get(key) {
            Some(LogValue::Integer(v)) => *v,
            _ => default,
        }
    }

    /// Stored float, or `default` on missing key / type mismatch.
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.entries.get(key) {
            Some(LogValue::Float(v)) => *v,
            _ => default,
        }
    }

    /// Stored text, or `default` on missing key / type mismatch.
    pub fn get_text(&self, key: &str, default: &str) -> String {
        match self.entries.get(key) {
            Some(LogValue::Text(v)) => v.clone(),
            _ => default.to_string(),
        }
    }

    /// Stored boolean array of exactly `N` elements, else `default`.
    ///
    /// A stored array of the wrong length is treated like a type mismatch:
    /// the array index order is the schema, so a length change means the
    /// field no longer carries the meaning the caller expects.
    pub fn get_bool_array<const N: usize>(&self, key: &str, default: [bool; N]) -> [bool; N] {
        match self.entries.get(key) {
            Some(LogValue::BooleanArray(v)) if v.len() == N => {
                let mut out = [false; N];
                out.copy_from_slice(v);
                out
            }
            _ => default,
        }
    }

    /// Stored integer array of exactly `N` elements, else `default`.
    pub fn get_int_array<const N: usize>(&self, key: &str, default: [i64; N]) -> [i64; N] {
        match self.entries.get(key) {
            Some(LogValue::IntegerArray(v)) if v.len() == N => {
                let mut out = [0i64; N];
                out.copy_from_slice(v);
                out
            }
            _ => default,
        }
    }

    /// Stored float array of exactly `N` elements, else `default`.
    pub fn get_float_array<const N: usize>(&self, key: &str, default: [f64; N]) -> [f64; N] {
        match self.entries.get(key) {
            Some(LogValue::FloatArray(v)) if v.len() == N => {
                let mut out = [0.0f64; N];
                out.copy_from_slice(v);
                out
            }
            _ => default,
        }
    }

    /// Stored text array of exactly `N` elements, else `default`.
    pub fn get_text_array<const N: usize>(&self, key: &str, default: [String; N]) -> [String; N] {
        match self.entries.get(key) {
            Some(LogValue::TextArray(v)) if v.len() == N => {
                core::array::from_fn(|i| v[i].clone())
            }
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut t = LogTable::new();
        t.put_bool("Compressor", true);
        t.put_int("Module ID", 3);
        t.put_float("Compressor Current", 3.2);
        t.put_text("Firmware", "1.4.0");
        t.put_bool_array("Faults", &[false, true, false, false]);
        t.put_int_array("Counts", &[1, 2, 3]);
        t.put_float_array("Currents", &[0.5, 1.5]);
        t.put_text_array("Names", &["a".to_string(), "b".to_string()]);

        assert!(t.get_bool("Compressor", false));
        assert_eq!(t.get_int("Module ID", 0), 3);
        assert_eq!(t.get_float("Compressor Current", 0.0), 3.2);
        assert_eq!(t.get_text("Firmware", ""), "1.4.0");
        assert_eq!(
            t.get_bool_array("Faults", [false; 4]),
            [false, true, false, false]
        );
        assert_eq!(t.get_int_array("Counts", [0; 3]), [1, 2, 3]);
        assert_eq!(t.get_float_array("Currents", [0.0; 2]), [0.5, 1.5]);
        assert_eq!(
            t.get_text_array("Names", [String::new(), String::new()]),
            ["a".to_string(), "b".to_string()]
        );
        assert_eq!(t.len(), 8);
    }

    #[test]
    fn missing_key_returns_default_without_mutation() {
        let mut t = LogTable::new();
        t.put_bool("Known", true);

        assert_eq!(t.get_float("Unknown", 7.5), 7.5);
        // The miss must not have created or disturbed any entry.
        assert_eq!(t.len(), 1);
        assert!(!t.contains_key("Unknown"));
        assert!(t.get_bool("Known", false));
    }

    #[test]
    fn type_mismatch_is_treated_as_absence() {
        let mut t = LogTable::new();
        t.put_int("Pressure", 40);

        assert_eq!(t.get_float("Pressure", 1.25), 1.25);
        assert!(!t.get_bool("Pressure", false));
        assert_eq!(t.get_bool_array("Pressure", [true; 2]), [true; 2]);
        // The entry itself is untouched.
        assert_eq!(t.get_int("Pressure", 0), 40);
    }

    #[test]
    fn array_length_mismatch_returns_default() {
        let mut t = LogTable::new();
        t.put_bool_array("Faults", &[true, true, true]);

        // Caller expects 4 elements, log holds 3: keep the default.
        assert_eq!(
            t.get_bool_array("Faults", [false, true, false, true]),
            [false, true, false, true]
        );
        // Matching length reads back the stored snapshot.
        assert_eq!(t.get_bool_array("Faults", [false; 3]), [true; 3]);
    }

    #[test]
    fn overwrite_is_always_legal() {
        let mut t = LogTable::new();
        t.put_int("Key", 1);
        t.put_float("Key", 2.0);
        assert_eq!(t.get_float("Key", 0.0), 2.0);
        assert_eq!(t.get_int("Key", -1), -1);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn put_copies_caller_array() {
        let mut states = [false; 4];
        let mut t = LogTable::new();
        t.put_bool_array("Solenoid States", &states);

        // Mutating the caller's array after put must not change the log.
        states[0] = true;
        assert_eq!(t.get_bool_array("Solenoid States", [true; 4]), [false; 4]);
    }

    #[test]
    fn iteration_order_is_deterministic() {
        let mut t = LogTable::new();
        t.put_bool("b", true);
        t.put_bool("a", true);
        t.put_bool("c", true);
        let keys: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn serde_round_trip_preserves_types() {
        let mut t = LogTable::new();
        t.put_int("Int", 3);
        t.put_float("Float", 3.0);
        t.put_bool_array("Bits", &[true, false]);

        let json = serde_json::to_string(&t).unwrap();
        let back: LogTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.get_int("Int", 0), 3);
        assert_eq!(back.get_float("Float", 0.0), 3.0);
        // Type fidelity: the integer did not become a float.
        assert_eq!(back.get_float("Int", -1.0), -1.0);
    }
}
