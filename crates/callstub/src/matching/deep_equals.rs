//! Structural equality for match attributes.
//!
//! Mapping keys are compared in canonical (sorted) order so that insertion
//! order never affects the result. Numbers compare by value, so `1` and
//! `1.0` are equal.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Deep, order-independent equality.
pub trait DeepEquals {
    fn deep_equals(&self, other: &Self) -> bool;
}

impl DeepEquals for Value {
    fn deep_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => objects_equal(a, b),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_equals(y))
            }
            (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
            _ => self == other,
        }
    }
}

impl DeepEquals for BTreeMap<String, String> {
    fn deep_equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl DeepEquals for BTreeMap<String, Value> {
    fn deep_equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka == kb && va.deep_equals(vb))
    }
}

/// Compare two optional fields; absent on both sides counts as equal.
pub fn optional_equals<T: DeepEquals>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.deep_equals(b),
        _ => false,
    }
}

fn objects_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut keys_a: Vec<&String> = a.keys().collect();
    let mut keys_b: Vec<&String> = b.keys().collect();
    keys_a.sort_unstable();
    keys_b.sort_unstable();
    if keys_a != keys_b {
        return false;
    }
    keys_a
        .into_iter()
        .all(|key| matches!((a.get(key), b.get(key)), (Some(x), Some(y)) if x.deep_equals(y)))
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_ignore_key_order() {
        let a: Value = serde_json::from_str(r#"{"a": 1, "b": {"x": [1, 2], "y": null}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": {"y": null, "x": [1, 2]}, "a": 1}"#).unwrap();
        assert!(a.deep_equals(&b));
    }

    #[test]
    fn test_array_order_is_significant() {
        assert!(!json!([1, 2]).deep_equals(&json!([2, 1])));
        assert!(!json!([1, 2]).deep_equals(&json!([1, 2, 3])));
    }

    #[test]
    fn test_no_subset_matching() {
        assert!(!json!({"a": 1}).deep_equals(&json!({"a": 1, "b": 2})));
        assert!(!json!({"a": 1, "b": 2}).deep_equals(&json!({"a": 1})));
        assert!(!json!({"a": 1, "b": 2}).deep_equals(&json!({"a": 1, "c": 2})));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(json!(1).deep_equals(&json!(1.0)));
        assert!(json!(-3).deep_equals(&json!(-3)));
        assert!(!json!(1).deep_equals(&json!(2)));
        assert!(!json!(1).deep_equals(&json!("1")));
    }

    #[test]
    fn test_optional_equals_presence_rules() {
        let v = json!({"q": "v"});
        assert!(optional_equals::<Value>(None, None));
        assert!(!optional_equals(Some(&v), None));
        assert!(!optional_equals(None, Some(&v)));
        assert!(optional_equals(Some(&v), Some(&json!({"q": "v"}))));
    }

    #[test]
    fn test_param_maps() {
        let a: BTreeMap<String, Value> = [("page".to_string(), json!(2))].into_iter().collect();
        let b: BTreeMap<String, Value> = [("page".to_string(), json!(2.0))].into_iter().collect();
        let c: BTreeMap<String, Value> = [("page".to_string(), json!("2"))].into_iter().collect();
        assert!(a.deep_equals(&b));
        assert!(!a.deep_equals(&c));
    }

    proptest! {
        #[test]
        fn prop_insertion_order_never_matters(
            entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..8)
        ) {
            let forward: Map<String, Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect();
            let reverse: Map<String, Value> = entries
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect();
            prop_assert!(Value::Object(forward).deep_equals(&Value::Object(reverse)));
        }
    }
}
