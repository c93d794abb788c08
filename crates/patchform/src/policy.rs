//! Patch policies: missing source fields and merge behaviour.

use crate::error::PatchError;
use patchform_paved::MergeOptions;
use serde::{Deserialize, Serialize};

/// What happens when a patch's source field does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FromFieldPathPolicy {
    /// A missing source field makes the patch a no-op.
    #[default]
    Optional,
    /// A missing source field is an error.
    Required,
}

impl FromFieldPathPolicy {
    /// The effective policy of a patch, `Optional` unless set otherwise.
    pub fn resolve(policy: Option<&PatchPolicy>) -> Self {
        policy
            .and_then(|p| p.from_field_path)
            .unwrap_or_default()
    }

    /// Returns true if `err` should be swallowed under this policy.
    #[inline]
    pub fn skips(self, err: &PatchError) -> bool {
        self == FromFieldPathPolicy::Optional && err.is_field_path_not_found()
    }
}

/// Per-patch policy block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_field_path: Option<FromFieldPathPolicy>,
    /// When set, the patched value is merged into the destination instead
    /// of replacing it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_options: Option<MergeOptions>,
}

impl PatchPolicy {
    pub fn required() -> Self {
        Self {
            from_field_path: Some(FromFieldPathPolicy::Required),
            merge_options: None,
        }
    }

    pub fn optional() -> Self {
        Self {
            from_field_path: Some(FromFieldPathPolicy::Optional),
            merge_options: None,
        }
    }

    pub fn with_merge_options(mut self, options: MergeOptions) -> Self {
        self.merge_options = Some(options);
        self
    }
}

/// Returns true if `err` reports a missing field and `policy` treats missing
/// source fields as optional.
pub fn is_optional_field_path_not_found(err: &PatchError, policy: Option<&PatchPolicy>) -> bool {
    FromFieldPathPolicy::resolve(policy).skips(err)
}
