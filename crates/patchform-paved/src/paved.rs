//! Field path access to JSON documents.

use crate::error::{value_type_name, PavedError, PavedResult};
use crate::merge::{merge_values, MergeOptions};
use crate::{Path, Segment};
use serde_json::{Map, Value};
use tracing::trace;

/// The most `null` entries a single index write may append to a sequence.
pub const MAX_INDEX_PADDING: usize = 1 << 16;

/// Read and write access to a document by field path.
///
/// Implemented for [`serde_json::Value`]; the patch engine only talks to
/// documents through this trait.
pub trait Paved {
    /// Get the value at `path`.
    ///
    /// Fails with [`PavedError::NotFound`] if any segment does not exist.
    /// A `null` along the way counts as missing.
    fn get_value(&self, path: &Path) -> PavedResult<&Value>;

    /// Set the value at `path`, creating intermediate maps and sequences.
    ///
    /// Setting an index past the end of a sequence pads it with `null`, up
    /// to [`MAX_INDEX_PADDING`] new entries; further out is
    /// [`PavedError::IndexOutOfBounds`]. Fails if an existing non-container
    /// value is in the way.
    fn set_value(&mut self, path: &Path, value: Value) -> PavedResult<()>;

    /// Merge `value` into whatever is at `path`, then set the result.
    fn merge_value(&mut self, path: &Path, value: Value, options: &MergeOptions)
        -> PavedResult<()>;

    /// Expand every wildcard in `path` into the concrete paths that exist in
    /// this document.
    ///
    /// Candidates whose later segments are missing are dropped, so the result
    /// may be empty.
    fn expand_wildcards(&self, path: &Path) -> PavedResult<Vec<Path>>;
}

impl Paved for Value {
    fn get_value(&self, path: &Path) -> PavedResult<&Value> {
        let mut current = self;
        for (depth, seg) in path.iter().enumerate() {
            let here = || path.truncated(depth + 1);
            current = match (seg, current) {
                (Segment::Wildcard, _) => {
                    return Err(PavedError::invalid_path(
                        path.to_string(),
                        "wildcards cannot be read directly",
                    ))
                }
                (_, Value::Null) => return Err(PavedError::not_found(here())),
                (Segment::Field(key), Value::Object(obj)) => {
                    obj.get(key).ok_or_else(|| PavedError::not_found(here()))?
                }
                (Segment::Index(idx), Value::Array(arr)) => {
                    arr.get(*idx).ok_or_else(|| PavedError::not_found(here()))?
                }
                (Segment::Field(_), other) => {
                    return Err(PavedError::type_mismatch(
                        path.truncated(depth),
                        "object",
                        value_type_name(other),
                    ))
                }
                (Segment::Index(_), other) => {
                    return Err(PavedError::type_mismatch(
                        path.truncated(depth),
                        "array",
                        value_type_name(other),
                    ))
                }
            };
        }
        if current.is_null() && !path.is_empty() {
            return Err(PavedError::not_found(path.clone()));
        }
        Ok(current)
    }

    fn set_value(&mut self, path: &Path, value: Value) -> PavedResult<()> {
        if path.has_wildcards() {
            return Err(PavedError::invalid_path(
                path.to_string(),
                "wildcards must be expanded before setting a value",
            ));
        }
        set_at_path(self, path.segments(), value, path, 0)
    }

    fn merge_value(
        &mut self,
        path: &Path,
        value: Value,
        options: &MergeOptions,
    ) -> PavedResult<()> {
        let merged = match self.get_value(path) {
            Ok(existing) => merge_values(existing.clone(), value, options),
            Err(err) if err.is_not_found() => value,
            Err(err) => return Err(err),
        };
        self.set_value(path, merged)
    }

    fn expand_wildcards(&self, path: &Path) -> PavedResult<Vec<Path>> {
        let mut expanded = Vec::new();
        expand_at_path(self, path.segments(), Path::root(), &mut expanded)?;
        trace!(%path, matches = expanded.len(), "expanded wildcards");
        Ok(expanded)
    }
}

/// Recursively set a value at a path, creating intermediate containers.
fn set_at_path(
    current: &mut Value,
    segments: &[Segment],
    value: Value,
    full_path: &Path,
    depth: usize,
) -> PavedResult<()> {
    let Some((head, rest)) = segments.split_first() else {
        *current = value;
        return Ok(());
    };

    match head {
        Segment::Field(key) => {
            if current.is_null() {
                *current = Value::Object(Map::new());
            }
            match current {
                Value::Object(obj) => {
                    let entry = obj.entry(key.clone()).or_insert(Value::Null);
                    set_at_path(entry, rest, value, full_path, depth + 1)
                }
                other => Err(PavedError::type_mismatch(
                    full_path.truncated(depth),
                    "object",
                    value_type_name(other),
                )),
            }
        }
        Segment::Index(idx) => {
            if current.is_null() {
                *current = Value::Array(Vec::new());
            }
            match current {
                Value::Array(arr) => {
                    if *idx >= arr.len() {
                        let new_len = idx
                            .checked_add(1)
                            .filter(|n| n - arr.len() <= MAX_INDEX_PADDING)
                            .ok_or_else(|| {
                                PavedError::index_out_of_bounds(
                                    full_path.truncated(depth),
                                    *idx,
                                    arr.len(),
                                )
                            })?;
                        arr.resize(new_len, Value::Null);
                    }
                    set_at_path(&mut arr[*idx], rest, value, full_path, depth + 1)
                }
                other => Err(PavedError::type_mismatch(
                    full_path.truncated(depth),
                    "array",
                    value_type_name(other),
                )),
            }
        }
        // Rejected by the caller before recursion starts.
        Segment::Wildcard => Err(PavedError::invalid_path(
            full_path.to_string(),
            "wildcards must be expanded before setting a value",
        )),
    }
}

/// Walk `segments` from `current`, pushing every concrete path that exists.
fn expand_at_path(
    current: &Value,
    segments: &[Segment],
    prefix: Path,
    out: &mut Vec<Path>,
) -> PavedResult<()> {
    let Some((head, rest)) = segments.split_first() else {
        out.push(prefix);
        return Ok(());
    };

    match (head, current) {
        (_, Value::Null) => Ok(()),
        (Segment::Wildcard, Value::Array(arr)) => {
            for (idx, item) in arr.iter().enumerate() {
                expand_at_path(item, rest, prefix.clone().index(idx), out)?;
            }
            Ok(())
        }
        (Segment::Wildcard, Value::Object(obj)) => {
            for (key, item) in obj {
                expand_at_path(item, rest, prefix.clone().field(key.clone()), out)?;
            }
            Ok(())
        }
        (Segment::Wildcard, other) => Err(PavedError::type_mismatch(
            prefix,
            "array or object",
            value_type_name(other),
        )),
        (Segment::Field(key), Value::Object(obj)) => match obj.get(key) {
            Some(item) => expand_at_path(item, rest, prefix.field(key.clone()), out),
            None => Ok(()),
        },
        (Segment::Index(idx), Value::Array(arr)) => match arr.get(*idx) {
            Some(item) => expand_at_path(item, rest, prefix.index(*idx), out),
            None => Ok(()),
        },
        (Segment::Field(_), other) => Err(PavedError::type_mismatch(
            prefix,
            "object",
            value_type_name(other),
        )),
        (Segment::Index(_), other) => Err(PavedError::type_mismatch(
            prefix,
            "array",
            value_type_name(other),
        )),
    }
}
