//! Field paths and paved JSON documents.
//!
//! `patchform-paved` lets callers read and write JSON documents by field path
//! strings such as `spec.containers[0].image`, and expand wildcard paths such
//! as `metadata.ownerReferences[*].name` into one concrete path per existing
//! element.
//!
//! # Quick Start
//!
//! ```
//! use patchform_paved::{Paved, Path};
//! use serde_json::json;
//!
//! let mut doc = json!({"refs": [{"name": ""}, {"name": ""}]});
//!
//! for path in doc.expand_wildcards(&Path::parse("refs[*].name").unwrap()).unwrap() {
//!     doc.set_value(&path, json!("owner")).unwrap();
//! }
//!
//! assert_eq!(doc["refs"][1]["name"], "owner");
//! assert!(doc.get_value(&Path::parse("refs[5]").unwrap()).unwrap_err().is_not_found());
//! ```

mod error;
mod merge;
mod paved;
mod path;

pub use error::{value_type_name, PavedError, PavedResult};
pub use merge::{merge_values, MergeOptions};
pub use paved::{Paved, MAX_INDEX_PADDING};
pub use path::{Path, Segment};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
