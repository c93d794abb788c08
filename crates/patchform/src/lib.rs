//! Declarative patch-and-transform engine for JSON resource documents.
//!
//! A *composite* document seeds or receives values from a *composed*
//! document through a list of patches. Each patch reads one value (or
//! combines several), runs it through a pipeline of transforms, and writes
//! the result, optionally across every element matched by a wildcard path.
//!
//! # Quick Start
//!
//! ```
//! use patchform::{apply, Patch, PatchType, StringTransform, Transform};
//! use serde_json::json;
//!
//! let mut composite = json!({"spec": {"region": "eu-west-1"}});
//! let mut composed = json!({});
//!
//! let patch = Patch::from_composite("spec.region")
//!     .with_to_field_path("spec.forProvider.location")
//!     .with_transform(Transform::String(StringTransform::format("aws-%s")));
//!
//! apply(&patch, &mut composite, &mut composed, &[]).unwrap();
//! assert_eq!(composed["spec"]["forProvider"]["location"], "aws-eu-west-1");
//!
//! // Only FromCompositeFieldPath patches run when filtered to them.
//! let back = Patch::to_composite("status.id");
//! apply(&back, &mut composite, &mut composed, &[PatchType::FromCompositeFieldPath]).unwrap();
//! ```
//!
//! Patch sets are expanded into templates with [`composed_templates`]
//! before their patches are applied.

mod combine;
mod error;
mod format;
mod model;
mod patch;
mod patch_set;
mod policy;
pub mod transform;
mod value;

pub use combine::{combine, CombineStrategyConfig};
pub use error::{FormatError, PatchError, PatchResult, TransformError};
pub use format::sprintf;
pub use model::{
    Combine, CombineStrategy, CombineVariable, ComposedTemplate, Patch, PatchSet, PatchType,
    StringCombine,
};
pub use patch::{apply, apply_all, CombinePatch, Direction, FieldPathPatch, PatchOp};
pub use patch_set::composed_templates;
pub use policy::{is_optional_field_path_not_found, FromFieldPathPolicy, PatchPolicy};
pub use transform::{
    resolve_transforms, ConvertFormat, ConvertTransform, ConvertType, MapTransform,
    MatchFallbackTo, MatchPattern, MatchTransform, MathTransform, MathType, StringConversion,
    StringTransform, StringTransformType, Transform,
};
pub use value::Value;

// Re-export the document layer for convenience
pub use patchform_paved::{MergeOptions, Paved, PavedError, Path};
