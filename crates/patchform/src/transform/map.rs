use crate::error::TransformError;
use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Looks the input up in a fixed table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapTransform {
    pub pairs: BTreeMap<String, serde_json::Value>,
    /// Returned when the key is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl MapTransform {
    pub fn new<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub(crate) fn resolve(&self, input: Value) -> Result<Value, TransformError> {
        let key = input.scalar_string().ok_or(TransformError::NotAString {
            found: input.type_name(),
        })?;
        match self.pairs.get(&key).or(self.default.as_ref()) {
            Some(found) => Ok(Value::from(found.clone())),
            None => Err(TransformError::MapKeyNotFound { key }),
        }
    }
}

/// Returns the result of the first pattern matching the input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTransform {
    #[serde(default)]
    pub patterns: Vec<MatchPattern>,
    /// Returned when nothing matches and `fallback_to` is `Value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_to: Option<MatchFallbackTo>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchFallbackTo {
    #[default]
    Value,
    Input,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPatternType {
    Literal,
    Regexp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPattern {
    #[serde(rename = "type")]
    pub pattern_type: MatchPatternType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl MatchPattern {
    pub fn literal(literal: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            pattern_type: MatchPatternType::Literal,
            literal: Some(literal.into()),
            regexp: None,
            result,
        }
    }

    pub fn regexp(regexp: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            pattern_type: MatchPatternType::Regexp,
            literal: None,
            regexp: Some(regexp.into()),
            result,
        }
    }

    fn matches(&self, index: usize, input: &str) -> Result<bool, TransformError> {
        let invalid = |reason: String| TransformError::InvalidPattern { index, reason };
        match self.pattern_type {
            MatchPatternType::Literal => {
                let literal = self
                    .literal
                    .as_deref()
                    .ok_or_else(|| invalid("literal pattern requires literal".into()))?;
                Ok(literal == input)
            }
            MatchPatternType::Regexp => {
                let pattern = self
                    .regexp
                    .as_deref()
                    .ok_or_else(|| invalid("regexp pattern requires regexp".into()))?;
                let re = Regex::new(pattern).map_err(|err| invalid(err.to_string()))?;
                Ok(re.is_match(input))
            }
        }
    }
}

impl MatchTransform {
    pub fn new(patterns: Vec<MatchPattern>) -> Self {
        Self {
            patterns,
            ..Default::default()
        }
    }

    pub fn with_fallback_value(mut self, value: serde_json::Value) -> Self {
        self.fallback_value = Some(value);
        self
    }

    pub fn with_fallback_to(mut self, to: MatchFallbackTo) -> Self {
        self.fallback_to = Some(to);
        self
    }

    pub(crate) fn resolve(&self, input: Value) -> Result<Value, TransformError> {
        let Some(text) = input.as_str() else {
            return Err(TransformError::NotAString {
                found: input.type_name(),
            });
        };
        for (index, pattern) in self.patterns.iter().enumerate() {
            if pattern.matches(index, text)? {
                return Ok(Value::from(pattern.result.clone()));
            }
        }
        match self.fallback_to.unwrap_or_default() {
            MatchFallbackTo::Input => Ok(input),
            MatchFallbackTo::Value => Ok(self
                .fallback_value
                .clone()
                .map(Value::from)
                .unwrap_or_default()),
        }
    }
}
