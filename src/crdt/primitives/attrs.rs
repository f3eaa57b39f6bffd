// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-14"
// driver = "Isaac Clayton"

//! Rich-text attribute maps and their normalization.
//!
//! Attributes are free-form JSON values keyed by name (`bold: true`,
//! `link: "https://..."`). A key with a falsy value means "attribute
//! absent", so normalization drops such keys and collapses an empty map to
//! no attributes at all. Maps are stored in a `BTreeMap` so iteration and
//! serialization are deterministic.
//!
//! Attribute maps are replaced wholesale, never merged: callers who want
//! old + new semantics merge before writing.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single attribute value.
pub type AttrValue = Value;

/// A set of named attributes on one atom.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Whether a value counts as "attribute absent".
///
/// Falsy values are JSON `null`, `false`, numeric zero, and the empty
/// string. Empty arrays and objects are kept.
pub fn is_falsy(value: &AttrValue) -> bool {
    return match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    };
}

/// Clone `attrs`, dropping falsy values; `None` when nothing survives.
pub fn normalize(attrs: &AttrMap) -> Option<AttrMap> {
    let kept: AttrMap = attrs
        .iter()
        .filter(|(_, value)| !is_falsy(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if kept.is_empty() {
        return None;
    }
    return Some(kept);
}

/// Normalize an optional map: `None` stays `None`.
pub fn normalize_opt(attrs: Option<&AttrMap>) -> Option<AttrMap> {
    return attrs.and_then(normalize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, AttrValue)]) -> AttrMap {
        return pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    }

    #[test]
    fn falsy_values() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(0.0)));
        assert!(is_falsy(&json!("")));

        assert!(!is_falsy(&json!(true)));
        assert!(!is_falsy(&json!(1)));
        assert!(!is_falsy(&json!("bold")));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
    }

    #[test]
    fn normalize_drops_falsy_keys() {
        let attrs = map(&[
            ("bold", json!(true)),
            ("italic", json!(false)),
            ("link", json!("")),
        ]);
        let kept = normalize(&attrs).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["bold"], json!(true));
    }

    #[test]
    fn normalize_collapses_empty_to_none() {
        let attrs = map(&[("bold", json!(false)), ("size", json!(0))]);
        assert_eq!(normalize(&attrs), None);
        assert_eq!(normalize(&AttrMap::new()), None);
    }

    #[test]
    fn normalize_opt_passes_none_through() {
        assert_eq!(normalize_opt(None), None);
        let attrs = map(&[("bold", json!(true))]);
        assert!(normalize_opt(Some(&attrs)).is_some());
    }
}
