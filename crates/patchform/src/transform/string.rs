use crate::error::TransformError;
use crate::format::sprintf;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// String manipulation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringTransform {
    #[serde(rename = "type", default)]
    pub string_type: StringTransformType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert: Option<StringConversion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<StringRegexp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<StringJoin>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringTransformType {
    #[default]
    Format,
    Convert,
    TrimPrefix,
    TrimSuffix,
    Regexp,
    Join,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringConversion {
    ToUpper,
    ToLower,
    ToBase64,
    FromBase64,
    ToJson,
    ToSha1,
    ToSha256,
    ToSha512,
}

/// Extracts a regular expression match, or one of its capture groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRegexp {
    #[serde(rename = "match")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringJoin {
    pub separator: String,
}

impl StringTransform {
    fn of(string_type: StringTransformType) -> Self {
        Self {
            string_type,
            ..Default::default()
        }
    }

    pub fn format(fmt: impl Into<String>) -> Self {
        Self {
            fmt: Some(fmt.into()),
            ..Self::of(StringTransformType::Format)
        }
    }

    pub fn convert(conversion: StringConversion) -> Self {
        Self {
            convert: Some(conversion),
            ..Self::of(StringTransformType::Convert)
        }
    }

    pub fn trim_prefix(prefix: impl Into<String>) -> Self {
        Self {
            trim: Some(prefix.into()),
            ..Self::of(StringTransformType::TrimPrefix)
        }
    }

    pub fn trim_suffix(suffix: impl Into<String>) -> Self {
        Self {
            trim: Some(suffix.into()),
            ..Self::of(StringTransformType::TrimSuffix)
        }
    }

    pub fn regexp(pattern: impl Into<String>, group: Option<usize>) -> Self {
        Self {
            regexp: Some(StringRegexp {
                pattern: pattern.into(),
                group,
            }),
            ..Self::of(StringTransformType::Regexp)
        }
    }

    pub fn join(separator: impl Into<String>) -> Self {
        Self {
            join: Some(StringJoin {
                separator: separator.into(),
            }),
            ..Self::of(StringTransformType::Join)
        }
    }

    pub(crate) fn resolve(&self, input: Value) -> Result<Value, TransformError> {
        let missing = |parameter| TransformError::missing("string", parameter);
        let out = match self.string_type {
            StringTransformType::Format => {
                let fmt = self.fmt.as_deref().ok_or_else(|| missing("fmt"))?;
                sprintf(fmt, &[input])?
            }
            StringTransformType::Convert => {
                let conversion = self.convert.ok_or_else(|| missing("convert"))?;
                convert(conversion, input)?
            }
            StringTransformType::TrimPrefix => {
                let trim = self.trim.as_deref().ok_or_else(|| missing("trim"))?;
                let s = input.to_string();
                s.strip_prefix(trim).map(str::to_owned).unwrap_or(s)
            }
            StringTransformType::TrimSuffix => {
                let trim = self.trim.as_deref().ok_or_else(|| missing("trim"))?;
                let s = input.to_string();
                s.strip_suffix(trim).map(str::to_owned).unwrap_or(s)
            }
            StringTransformType::Regexp => {
                let regexp = self.regexp.as_ref().ok_or_else(|| missing("regexp"))?;
                extract(regexp, &input.to_string())?
            }
            StringTransformType::Join => {
                let join = self.join.as_ref().ok_or_else(|| missing("join"))?;
                let found = input.type_name();
                let Value::Array(items) = input else {
                    return Err(TransformError::NotAnArray { found });
                };
                items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(&join.separator)
            }
        };
        Ok(Value::String(out))
    }
}

fn convert(conversion: StringConversion, input: Value) -> Result<String, TransformError> {
    Ok(match conversion {
        StringConversion::ToUpper => input.to_string().to_uppercase(),
        StringConversion::ToLower => input.to_string().to_lowercase(),
        StringConversion::ToBase64 => STANDARD.encode(input.to_string()),
        StringConversion::FromBase64 => {
            let decoded = STANDARD
                .decode(input.to_string())
                .map_err(|err| TransformError::Base64 {
                    reason: err.to_string(),
                })?;
            String::from_utf8(decoded).map_err(|err| TransformError::Base64 {
                reason: err.to_string(),
            })?
        }
        StringConversion::ToJson => serde_json::to_string(&serde_json::Value::from(input))?,
        StringConversion::ToSha1 => format!("{:x}", Sha1::digest(hash_input(input)?)),
        StringConversion::ToSha256 => format!("{:x}", Sha256::digest(hash_input(input)?)),
        StringConversion::ToSha512 => format!("{:x}", Sha512::digest(hash_input(input)?)),
    })
}

/// Strings hash as their bytes, anything else as its JSON encoding.
fn hash_input(input: Value) -> Result<Vec<u8>, TransformError> {
    match input {
        Value::String(s) => Ok(s.into_bytes()),
        other => Ok(serde_json::to_vec(&serde_json::Value::from(other))?),
    }
}

fn extract(regexp: &StringRegexp, input: &str) -> Result<String, TransformError> {
    let re = Regex::new(&regexp.pattern).map_err(|err| TransformError::InvalidRegexp {
        pattern: regexp.pattern.clone(),
        reason: err.to_string(),
    })?;
    let group = regexp.group.unwrap_or(0);
    re.captures(input)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| TransformError::RegexpNoMatch {
            pattern: regexp.pattern.clone(),
            group,
        })
}
