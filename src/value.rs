//! Member lookup and shallow merging over `serde_json::Value`.
use serde_json::{Map, Value};

/// The member of `value` named `key`, if it has one.
///
/// Objects are looked up by key; arrays by a canonical decimal index
/// (`"0"`, `"12"`, never `"01"` or `"+1"`). Scalars and `null` have no
/// members.
pub fn member<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(xs) => {
            let index = key.parse::<usize>().ok()?;
            if index.to_string() != key {
                return None;
            }
            xs.get(index)
        }
        _ => None,
    }
}

/// Copies every member of each mapping in `sources` onto `dest`, in order.
/// Later sources win; anything that is not a mapping is skipped.
pub fn extend_object<'a, I>(dest: &mut Map<String, Value>, sources: I)
where
    I: IntoIterator<Item = &'a Value>,
{
    for source in sources {
        if let Value::Object(map) = source {
            for (key, value) in map {
                dest.insert(key.clone(), value.clone());
            }
        }
    }
}
