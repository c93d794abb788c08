use crate::error::TransformError;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Arithmetic on a numeric value. The result keeps the input's numeric type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathTransform {
    #[serde(rename = "type", default)]
    pub math_type: MathType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiply: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp_max: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathType {
    #[default]
    Multiply,
    ClampMin,
    ClampMax,
}

impl MathTransform {
    pub fn multiply(by: i64) -> Self {
        Self {
            multiply: Some(by),
            ..Default::default()
        }
    }

    pub fn clamp_min(min: i64) -> Self {
        Self {
            math_type: MathType::ClampMin,
            clamp_min: Some(min),
            ..Default::default()
        }
    }

    pub fn clamp_max(max: i64) -> Self {
        Self {
            math_type: MathType::ClampMax,
            clamp_max: Some(max),
            ..Default::default()
        }
    }

    pub(crate) fn resolve(&self, input: Value) -> Result<Value, TransformError> {
        if !input.is_number() {
            return Err(TransformError::NotNumeric {
                found: input.type_name(),
            });
        }
        let (operation, operand) = match self.math_type {
            MathType::Multiply => ("multiply", self.multiply),
            MathType::ClampMin => ("clampMin", self.clamp_min),
            MathType::ClampMax => ("clampMax", self.clamp_max),
        };
        let operand = operand.ok_or(TransformError::MissingOperand { operation })?;
        let overflow = TransformError::Overflow { operation };

        match (self.math_type, input) {
            (MathType::Multiply, Value::Int(i)) => {
                i.checked_mul(operand).map(Value::Int).ok_or(overflow)
            }
            (MathType::Multiply, Value::Float(f)) => {
                let product = f * operand as f64;
                if product.is_finite() {
                    Ok(Value::Float(product))
                } else {
                    Err(overflow)
                }
            }
            (MathType::ClampMin, Value::Int(i)) => Ok(Value::Int(i.max(operand))),
            (MathType::ClampMin, Value::Float(f)) => Ok(Value::Float(f.max(operand as f64))),
            (MathType::ClampMax, Value::Int(i)) => Ok(Value::Int(i.min(operand))),
            (MathType::ClampMax, Value::Float(f)) => Ok(Value::Float(f.min(operand as f64))),
            (_, other) => Err(TransformError::NotNumeric {
                found: other.type_name(),
            }),
        }
    }
}
