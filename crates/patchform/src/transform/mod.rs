//! Value transforms applied between reading and writing a patched value.
//!
//! On the wire a transform is `{type, <payload>: {...}}` where the payload key
//! matches the type. It decodes into [`Transform`], which carries exactly the
//! payload its type names.

mod convert;
mod map;
mod math;
mod string;

pub use convert::{ConvertFormat, ConvertTransform, ConvertType};
pub use map::{MapTransform, MatchFallbackTo, MatchPattern, MatchPatternType, MatchTransform};
pub use math::{MathTransform, MathType};
pub use string::{StringConversion, StringJoin, StringRegexp, StringTransform, StringTransformType};

use crate::error::{PatchError, PatchResult, TransformError};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A single value transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransform", into = "RawTransform")]
pub enum Transform {
    Convert(ConvertTransform),
    Math(MathTransform),
    Map(MapTransform),
    Match(MatchTransform),
    String(StringTransform),
}

impl Transform {
    /// Apply this transform to `input`.
    pub fn resolve(&self, input: Value) -> Result<Value, TransformError> {
        match self {
            Transform::Convert(t) => t.resolve(input),
            Transform::Math(t) => t.resolve(input),
            Transform::Map(t) => t.resolve(input),
            Transform::Match(t) => t.resolve(input),
            Transform::String(t) => t.resolve(input),
        }
    }

    pub fn transform_type(&self) -> TransformType {
        match self {
            Transform::Convert(_) => TransformType::Convert,
            Transform::Math(_) => TransformType::Math,
            Transform::Map(_) => TransformType::Map,
            Transform::Match(_) => TransformType::Match,
            Transform::String(_) => TransformType::String,
        }
    }
}

/// Run `transforms` over `input` in order.
///
/// An empty list returns `input` unchanged. The first failing step aborts
/// the pipeline with [`PatchError::Transform`] naming its index.
pub fn resolve_transforms(transforms: &[Transform], input: Value) -> PatchResult<Value> {
    transforms
        .iter()
        .enumerate()
        .try_fold(input, |value, (index, transform)| {
            transform
                .resolve(value)
                .map_err(|source| PatchError::Transform { index, source })
        })
}

/// Discriminator of a transform on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformType {
    #[serde(alias = "Convert")]
    Convert,
    #[serde(alias = "Math")]
    Math,
    #[serde(alias = "Map")]
    Map,
    #[serde(alias = "Match")]
    Match,
    #[serde(alias = "String")]
    String,
}

impl TransformType {
    fn as_str(self) -> &'static str {
        match self {
            TransformType::Convert => "convert",
            TransformType::Math => "math",
            TransformType::Map => "map",
            TransformType::Match => "match",
            TransformType::String => "string",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawTransform {
    #[serde(rename = "type")]
    transform_type: TransformType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    convert: Option<ConvertTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    math: Option<MathTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    map: Option<MapTransform>,
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    matches: Option<MatchTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string: Option<StringTransform>,
}

impl TryFrom<RawTransform> for Transform {
    type Error = TransformError;

    fn try_from(raw: RawTransform) -> Result<Self, Self::Error> {
        let kind = raw.transform_type.as_str();
        let missing = || TransformError::missing(kind, kind);
        match raw.transform_type {
            TransformType::Convert => raw.convert.map(Transform::Convert).ok_or_else(missing),
            TransformType::Math => raw.math.map(Transform::Math).ok_or_else(missing),
            TransformType::Map => raw.map.map(Transform::Map).ok_or_else(missing),
            TransformType::Match => raw.matches.map(Transform::Match).ok_or_else(missing),
            TransformType::String => raw.string.map(Transform::String).ok_or_else(missing),
        }
    }
}

impl From<Transform> for RawTransform {
    fn from(transform: Transform) -> Self {
        let mut raw = RawTransform {
            transform_type: transform.transform_type(),
            convert: None,
            math: None,
            map: None,
            matches: None,
            string: None,
        };
        match transform {
            Transform::Convert(t) => raw.convert = Some(t),
            Transform::Math(t) => raw.math = Some(t),
            Transform::Map(t) => raw.map = Some(t),
            Transform::Match(t) => raw.matches = Some(t),
            Transform::String(t) => raw.string = Some(t),
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_accepts_both_cases() {
        let lower: Transform = serde_json::from_value(json!({
            "type": "math",
            "math": {"multiply": 2},
        }))
        .unwrap();
        let upper: Transform = serde_json::from_value(json!({
            "type": "Math",
            "math": {"multiply": 2},
        }))
        .unwrap();
        assert_eq!(lower, upper);
        assert!(matches!(lower, Transform::Math(_)));
    }

    #[test]
    fn test_decode_requires_payload() {
        let err = serde_json::from_value::<Transform>(json!({"type": "map"})).unwrap_err();
        assert!(err.to_string().contains("map transform requires map"));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(serde_json::from_value::<Transform>(json!({"type": "lua"})).is_err());
    }

    #[test]
    fn test_encode_uses_payload_key() {
        let transform: Transform = serde_json::from_value(json!({
            "type": "Match",
            "match": {"patterns": []},
        }))
        .unwrap();
        let encoded = serde_json::to_value(&transform).unwrap();
        assert_eq!(encoded["type"], "match");
        assert!(encoded.get("match").is_some());
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let out = resolve_transforms(&[], Value::Int(2)).unwrap();
        assert_eq!(out, Value::Int(2));
    }

    #[test]
    fn test_pipeline_reports_failing_index() {
        let transforms: Vec<Transform> = serde_json::from_value(json!([
            {"type": "math", "math": {"multiply": 2}},
            {"type": "map", "map": {"pairs": {"4": "four"}}},
            {"type": "math", "math": {"multiply": 2}},
        ]))
        .unwrap();

        let err = resolve_transforms(&transforms, Value::Int(2)).unwrap_err();
        assert!(matches!(
            err,
            PatchError::Transform {
                index: 2,
                source: TransformError::NotNumeric { found: "string" }
            }
        ));
    }
}
