use crate::error::TransformError;
use crate::value::{format_float, Value};
use serde::{Deserialize, Serialize};

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_FLOAT_INT: u64 = 1 << 53;

/// Converts a value to another type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertTransform {
    pub to_type: ConvertType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ConvertFormat>,
}

/// Target type of a conversion. `int` is an alias of `int64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertType {
    String,
    Int,
    Int64,
    Bool,
    Float64,
    Object,
    Array,
}

impl ConvertType {
    fn as_str(self) -> &'static str {
        match self {
            ConvertType::String => "string",
            ConvertType::Int | ConvertType::Int64 => "int64",
            ConvertType::Bool => "bool",
            ConvertType::Float64 => "float64",
            ConvertType::Object => "object",
            ConvertType::Array => "array",
        }
    }
}

/// How a string input is interpreted before conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertFormat {
    #[default]
    None,
    /// A resource quantity such as `250m` or `1.5Gi`.
    Quantity,
    /// A JSON document.
    Json,
}

impl ConvertTransform {
    pub fn new(to_type: ConvertType) -> Self {
        Self {
            to_type,
            format: None,
        }
    }

    pub fn with_format(mut self, format: ConvertFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub(crate) fn resolve(&self, input: Value) -> Result<Value, TransformError> {
        match self.format.unwrap_or_default() {
            ConvertFormat::None => convert(input, self.to_type),
            ConvertFormat::Json => from_json(input, self.to_type),
            ConvertFormat::Quantity => from_quantity(input, self.to_type),
        }
    }
}

fn unsupported(input: &Value, to: ConvertType) -> TransformError {
    TransformError::ConversionUnsupported {
        from: input.type_name(),
        to: to.as_str(),
    }
}

fn convert(input: Value, to: ConvertType) -> Result<Value, TransformError> {
    use ConvertType as T;

    let failed =
        |input: &dyn ToString| TransformError::conversion_failed(input.to_string(), to.as_str());
    match (input, to) {
        (v @ Value::String(_), T::String)
        | (v @ Value::Int(_), T::Int | T::Int64)
        | (v @ Value::Float(_), T::Float64)
        | (v @ Value::Bool(_), T::Bool)
        | (v @ Value::Object(_), T::Object)
        | (v @ Value::Array(_), T::Array) => Ok(v),

        (Value::String(s), T::Int | T::Int64) => {
            s.parse::<i64>().map(Value::Int).map_err(|_| failed(&s))
        }
        (Value::String(s), T::Float64) => match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(failed(&s)),
        },
        (Value::String(s), T::Bool) => {
            parse_bool(&s).map(Value::Bool).ok_or_else(|| failed(&s))
        }

        (Value::Int(i), T::String) => Ok(Value::String(i.to_string())),
        (Value::Int(i), T::Float64) if i.unsigned_abs() <= MAX_SAFE_FLOAT_INT => {
            Ok(Value::Float(i as f64))
        }
        (Value::Int(i), T::Float64) => Err(failed(&i)),
        (Value::Int(0), T::Bool) => Ok(Value::Bool(false)),
        (Value::Int(1), T::Bool) => Ok(Value::Bool(true)),
        (Value::Int(i), T::Bool) => Err(failed(&i)),

        (Value::Float(f), T::String) => Ok(Value::String(format_float(f))),
        (Value::Float(f), T::Int | T::Int64) => float_to_int(f)
            .map(Value::Int)
            .ok_or_else(|| failed(&format_float(f))),
        (Value::Float(f), T::Bool) if f == 0.0 => Ok(Value::Bool(false)),
        (Value::Float(f), T::Bool) if f == 1.0 => Ok(Value::Bool(true)),
        (Value::Float(f), T::Bool) => Err(failed(&format_float(f))),

        (Value::Bool(b), T::String) => Ok(Value::String(b.to_string())),
        (Value::Bool(b), T::Int | T::Int64) => Ok(Value::Int(i64::from(b))),
        (Value::Bool(b), T::Float64) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),

        (input, to) => Err(unsupported(&input, to)),
    }
}

/// Accepts the spellings Go's `strconv.ParseBool` does.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    // 2^63 itself is out of range, so compare against it exclusively.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.fract() == 0.0 && f >= -LIMIT && f < LIMIT).then_some(f as i64)
}

/// Decode a JSON string whose value must already have the target type.
fn from_json(input: Value, to: ConvertType) -> Result<Value, TransformError> {
    use serde_json::Value as J;
    use ConvertType as T;

    let from = input.type_name();
    let Value::String(text) = input else {
        return Err(TransformError::ConversionUnsupported {
            from,
            to: to.as_str(),
        });
    };
    let decoded: J = serde_json::from_str(&text)?;
    let converted = match (decoded, to) {
        (J::Number(n), T::Int | T::Int64) => n.as_i64().map(Value::Int),
        (J::Number(n), T::Float64) => n.as_f64().map(Value::Float),
        (v @ J::String(_), T::String)
        | (v @ J::Bool(_), T::Bool)
        | (v @ J::Object(_), T::Object)
        | (v @ J::Array(_), T::Array) => Some(Value::from(v)),
        _ => None,
    };
    converted.ok_or_else(|| TransformError::conversion_failed(text, to.as_str()))
}

fn from_quantity(input: Value, to: ConvertType) -> Result<Value, TransformError> {
    let from = input.type_name();
    let Value::String(text) = input else {
        return Err(TransformError::ConversionUnsupported {
            from,
            to: to.as_str(),
        });
    };
    let failed = || TransformError::conversion_failed(&text, to.as_str());
    let quantity = parse_quantity(&text).ok_or_else(failed)?;
    match to {
        ConvertType::Float64 => Ok(Value::Float(quantity)),
        ConvertType::Int | ConvertType::Int64 => {
            float_to_int(quantity).map(Value::Int).ok_or_else(failed)
        }
        ConvertType::String => Ok(Value::String(text.clone())),
        other => Err(TransformError::ConversionUnsupported {
            from: "quantity",
            to: other.as_str(),
        }),
    }
}

const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
];

/// Decimal SI suffixes as powers of ten.
const DECIMAL_SUFFIXES: [(&str, i32); 9] = [
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Parse a resource quantity such as `250m`, `1.5Gi`, `10k` or `1e3`.
fn parse_quantity(text: &str) -> Option<f64> {
    let text = text.trim();
    let binary = BINARY_SUFFIXES
        .iter()
        .find_map(|(suffix, mult)| Some((text.strip_suffix(suffix)?, *mult, 0)));
    let decimal = || {
        DECIMAL_SUFFIXES
            .iter()
            .find_map(|(suffix, exp)| Some((text.strip_suffix(suffix)?, 1.0, *exp)))
    };
    let (number, multiplier, exp) = binary.or_else(decimal).unwrap_or((text, 1.0, 0));

    let valid = !number.is_empty()
        && number
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'));
    if !valid {
        return None;
    }
    let mut value = number.parse::<f64>().ok()? * multiplier;
    if exp > 0 {
        value *= 10f64.powi(exp);
    } else if exp < 0 {
        value /= 10f64.powi(-exp);
    }
    value.is_finite().then_some(value)
}
