//! Deep merge of JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a value is merged into an existing value instead of replacing it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOptions {
    /// Keep existing values when both sides define the same key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_map_values: Option<bool>,
    /// Append sequences instead of replacing them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_slice: Option<bool>,
}

impl MergeOptions {
    /// Returns true if existing map values win over incoming ones.
    #[inline]
    pub fn keep_map_values(&self) -> bool {
        self.keep_map_values.unwrap_or(false)
    }

    /// Returns true if sequences are appended.
    #[inline]
    pub fn append_slice(&self) -> bool {
        self.append_slice.unwrap_or(false)
    }
}

/// Merge `src` into `dst`.
///
/// Maps merge recursively. Sequences are appended when `append_slice` is set
/// and otherwise treated like scalars. For scalars and mismatched kinds the
/// incoming value wins unless `keep_map_values` is set. A null destination
/// always takes the incoming value.
pub fn merge_values(dst: Value, src: Value, options: &MergeOptions) -> Value {
    match (dst, src) {
        (Value::Null, src) => src,
        (Value::Object(mut dst), Value::Object(src)) => {
            for (key, incoming) in src {
                let merged = match dst.remove(&key) {
                    Some(existing) => merge_values(existing, incoming, options),
                    None => incoming,
                };
                dst.insert(key, merged);
            }
            Value::Object(dst)
        }
        (Value::Array(mut dst), Value::Array(src)) if options.append_slice() => {
            dst.extend(src);
            Value::Array(dst)
        }
        (dst, src) => {
            if options.keep_map_values() {
                dst
            } else {
                src
            }
        }
    }
}
