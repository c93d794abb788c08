//! Declarative rule schema: patches, patch sets, combine blocks and templates.
//!
//! These types mirror the wire format (camelCase JSON or YAML) and are
//! validated into [`PatchOp`](crate::PatchOp) before they are applied.

use crate::policy::PatchPolicy;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a patch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchType {
    /// Copy a value from the composite to the composed document.
    FromCompositeFieldPath,
    /// Copy a value from the composed document to the composite.
    ToCompositeFieldPath,
    /// Combine several composite values into one composed value.
    CombineFromComposite,
    /// Combine several composed values into one composite value.
    CombineToComposite,
    /// Reference to a named patch set.
    PatchSet,
    /// Any other type name. Never applied.
    #[serde(untagged)]
    Unrecognized(String),
}

impl PatchType {
    /// The wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            PatchType::FromCompositeFieldPath => "FromCompositeFieldPath",
            PatchType::ToCompositeFieldPath => "ToCompositeFieldPath",
            PatchType::CombineFromComposite => "CombineFromComposite",
            PatchType::CombineToComposite => "CombineToComposite",
            PatchType::PatchSet => "PatchSet",
            PatchType::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single patch rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(rename = "type")]
    pub patch_type: PatchType,
    /// Source path for simple patches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_field_path: Option<String>,
    /// Destination path. Simple patches fall back to `from_field_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_field_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine: Option<Combine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PatchPolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,
}

impl Patch {
    /// Create an empty patch of the given type.
    pub fn new(patch_type: PatchType) -> Self {
        Self {
            patch_type,
            from_field_path: None,
            to_field_path: None,
            combine: None,
            patch_set_name: None,
            policy: None,
            transforms: Vec::new(),
        }
    }

    /// A `FromCompositeFieldPath` patch reading `from`.
    pub fn from_composite(from: impl Into<String>) -> Self {
        Self::new(PatchType::FromCompositeFieldPath).with_from_field_path(from)
    }

    /// A `ToCompositeFieldPath` patch reading `from`.
    pub fn to_composite(from: impl Into<String>) -> Self {
        Self::new(PatchType::ToCompositeFieldPath).with_from_field_path(from)
    }

    /// A `CombineFromComposite` patch writing to `to`.
    pub fn combine_from_composite(combine: Combine, to: impl Into<String>) -> Self {
        Self::new(PatchType::CombineFromComposite)
            .with_combine(combine)
            .with_to_field_path(to)
    }

    /// A `CombineToComposite` patch writing to `to`.
    pub fn combine_to_composite(combine: Combine, to: impl Into<String>) -> Self {
        Self::new(PatchType::CombineToComposite)
            .with_combine(combine)
            .with_to_field_path(to)
    }

    /// A reference to the patch set called `name`.
    pub fn patch_set(name: impl Into<String>) -> Self {
        let mut patch = Self::new(PatchType::PatchSet);
        patch.patch_set_name = Some(name.into());
        patch
    }

    pub fn with_from_field_path(mut self, path: impl Into<String>) -> Self {
        self.from_field_path = Some(path.into());
        self
    }

    pub fn with_to_field_path(mut self, path: impl Into<String>) -> Self {
        self.to_field_path = Some(path.into());
        self
    }

    pub fn with_combine(mut self, combine: Combine) -> Self {
        self.combine = Some(combine);
        self
    }

    pub fn with_policy(mut self, policy: PatchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Append a transform step.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }
}

/// How several source values are merged into one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combine {
    #[serde(default)]
    pub variables: Vec<CombineVariable>,
    pub strategy: CombineStrategy,
    /// Configuration for [`CombineStrategy::String`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<StringCombine>,
}

impl Combine {
    /// A `string` combine rendering `variables` through `format`.
    pub fn string<I, S>(variables: I, format: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(CombineVariable::new).collect(),
            strategy: CombineStrategy::String,
            string: Some(StringCombine {
                format: format.into(),
            }),
        }
    }
}

/// One source of a combine patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineVariable {
    pub from_field_path: String,
}

impl CombineVariable {
    pub fn new(from_field_path: impl Into<String>) -> Self {
        Self {
            from_field_path: from_field_path.into(),
        }
    }
}

/// Named combine strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineStrategy {
    #[serde(rename = "string")]
    String,
    #[serde(untagged)]
    Unrecognized(String),
}

impl fmt::Display for CombineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineStrategy::String => f.write_str("string"),
            CombineStrategy::Unrecognized(name) => f.write_str(name),
        }
    }
}

/// Configuration of the `string` combine strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringCombine {
    #[serde(alias = "fmt")]
    pub format: String,
}

/// A named, reusable group of patches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchSet {
    pub name: String,
    #[serde(default)]
    pub patches: Vec<Patch>,
}

impl PatchSet {
    pub fn new(name: impl Into<String>, patches: Vec<Patch>) -> Self {
        Self {
            name: name.into(),
            patches,
        }
    }
}

/// A composed resource template: a base document plus its patches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposedTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "empty_object")]
    pub base: serde_json::Value,
    #[serde(default)]
    pub patches: Vec<Patch>,
}

impl ComposedTemplate {
    pub fn new(name: impl Into<String>, patches: Vec<Patch>) -> Self {
        Self {
            name: Some(name.into()),
            base: empty_object(),
            patches,
        }
    }

    pub fn with_base(mut self, base: serde_json::Value) -> Self {
        self.base = base;
        self
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_type_decodes_unknown_names() {
        let known: PatchType = serde_json::from_value(json!("CombineToComposite")).unwrap();
        assert_eq!(known, PatchType::CombineToComposite);

        let unknown: PatchType = serde_json::from_value(json!("Foo")).unwrap();
        assert_eq!(unknown, PatchType::Unrecognized("Foo".into()));
        assert_eq!(unknown.to_string(), "Foo");
    }

    #[test]
    fn test_patch_from_wire() {
        let patch: Patch = serde_json::from_value(json!({
            "type": "FromCompositeFieldPath",
            "fromFieldPath": "metadata.labels",
            "toFieldPath": "metadata.labels",
        }))
        .unwrap();
        assert_eq!(
            patch,
            Patch::from_composite("metadata.labels").with_to_field_path("metadata.labels")
        );
        assert!(patch.transforms.is_empty());
    }

    #[test]
    fn test_combine_accepts_fmt_alias() {
        let combine: Combine = serde_json::from_value(json!({
            "variables": [{"fromFieldPath": "a"}, {"fromFieldPath": "b"}],
            "strategy": "string",
            "string": {"fmt": "%s-%s"},
        }))
        .unwrap();
        assert_eq!(combine, Combine::string(["a", "b"], "%s-%s"));
    }

    #[test]
    fn test_unknown_combine_strategy_decodes() {
        let combine: Combine = serde_json::from_value(json!({
            "variables": [{"fromFieldPath": "a"}],
            "strategy": "lua",
        }))
        .unwrap();
        assert_eq!(combine.strategy, CombineStrategy::Unrecognized("lua".into()));
    }

    #[test]
    fn test_template_base_defaults_to_empty_object() {
        let template: ComposedTemplate =
            serde_json::from_value(json!({"name": "bucket"})).unwrap();
        assert_eq!(template.base, json!({}));
        assert!(template.patches.is_empty());
    }

    #[test]
    fn test_patch_serializes_camel_case() {
        let patch = Patch::patch_set("common");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"type": "PatchSet", "patchSetName": "common"})
        );
    }
}
