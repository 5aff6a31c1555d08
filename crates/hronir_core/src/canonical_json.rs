//! crates/hronir_core/src/canonical_json.rs
//! Canonical JSON encoding used to derive content hashes:
//! object keys sorted lexicographically (UTF-8 codepoint order), arrays keep
//! caller-supplied order, compact output, no trailing newline.
//!
//! This crate has no on-disk artifacts of its own, so only the in-memory
//! encoder is kept (no atomic file writer — the engine's only durable
//! artifact is the SQLite database file, not a tree of canonical JSON
//! documents).

#![forbid(unsafe_code)]

use serde::Serialize;
use serde_json::Value;

/// Convert any `Serialize` value to canonical JSON bytes (compact, sorted keys).
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    let mut out = Vec::with_capacity(256);
    write_canonical_value(&v, &mut out);
    Ok(out)
}

fn write_canonical_value(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => {
            let quoted = serde_json::to_string(s).expect("string serialization cannot fail");
            out.extend_from_slice(quoted.as_bytes());
        }
        Value::Array(arr) => {
            out.push(b'[');
            for (i, elem) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical_value(elem, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
            keys.sort_unstable();
            for (i, k) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                let quoted_key = serde_json::to_string(k).expect("key serialization cannot fail");
                out.extend_from_slice(quoted_key.as_bytes());
                out.push(b':');
                write_canonical_value(&map[k], out);
            }
            out.push(b'}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_are_sorted_arrays_preserved() {
        let v = json!({
            "b": 1,
            "a": { "y": 1, "x": 2 },
            "arr": [ {"k":2,"j":1}, 3, "z" ]
        });
        let bytes = to_canonical_bytes(&v).unwrap();
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(
            s,
            r#"{"a":{"x":2,"y":1},"arr":[{"j":1,"k":2},3,"z"],"b":1}"#
        );
    }

    #[test]
    fn no_trailing_newline_and_deterministic() {
        let v = json!({"z": 1, "a": 2});
        let a = to_canonical_bytes(&v).unwrap();
        let b = to_canonical_bytes(&v).unwrap();
        assert_eq!(a, b);
        assert!(!a.ends_with(b"\n"));
    }
}
