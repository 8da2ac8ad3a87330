//! `recall show`: decode one entry and print it as JSON.

use recall_cache::{CacheStore, Lookup};
use recall_common::Value;
use serde_json::{json, Map, Number};

use crate::GlobalArgs;

/// Runs the `recall show` command.
pub fn run(key: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    CacheStore::validate_key(key)?;
    let store = global.open_store()?;
    match store.read(key)? {
        Lookup::Hit(value) => {
            println!("{}", serde_json::to_string_pretty(&to_json(&value))?);
            Ok(0)
        }
        Lookup::Absent => Err(format!("no entry for key '{key}'").into()),
        Lookup::Corrupt(e) => Err(format!("entry '{key}' is corrupt: {e}").into()),
    }
}

/// Converts a cached value to JSON for display.
///
/// Maps with only string keys become objects; other maps become a list of
/// `[key, value]` pairs. Arrays are summarized, not dumped element by
/// element. Non-finite floats are rendered as strings.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::None => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| json!(format!("{f:?}"))),
        Value::Str(s) => json!(s),
        Value::Bytes(b) => json!({ "bytes": b.len() }),
        Value::List(items) | Value::Tuple(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect())
        }
        Value::Map(entries) => {
            let object: Option<Map<String, serde_json::Value>> = entries
                .iter()
                .map(|(k, v)| k.as_str().map(|name| (name.to_string(), to_json(v))))
                .collect();
            match object {
                Some(object) => serde_json::Value::Object(object),
                None => entries
                    .iter()
                    .map(|(k, v)| json!([to_json(k), to_json(v)]))
                    .collect(),
            }
        }
        Value::Array(array) => json!({
            "dtype": array.dtype().name(),
            "shape": array.shape(),
            "summary": array.to_string(),
        }),
    }
}
