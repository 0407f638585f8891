use serde_json::Value;

use super::model::{Candidate, NutritionRecord, REQUIRED_FIELDS};
use crate::error::ValidationError;

/// Schema gate for untrusted model output.
pub struct NutritionValidator;

impl NutritionValidator {
    /// All required keys present, each an integer, float or string.
    pub fn validate(candidate: &Candidate) -> Result<(), ValidationError> {
        let obj = candidate.as_object().ok_or(ValidationError::NotAnObject)?;
        for field in REQUIRED_FIELDS {
            let value = obj.get(field).ok_or(ValidationError::MissingField(field))?;
            match value {
                Value::Number(_) | Value::String(_) => {}
                other => {
                    return Err(ValidationError::UnsupportedType {
                        field,
                        kind: kind_of(other),
                    })
                }
            }
        }
        Ok(())
    }

    /// Validate, then coerce into a typed record.
    pub fn into_record(candidate: &Candidate) -> Result<NutritionRecord, ValidationError> {
        Self::validate(candidate)?;
        let obj = candidate.as_object().ok_or(ValidationError::NotAnObject)?;
        let field = |name: &'static str| obj.get(name).ok_or(ValidationError::MissingField(name));

        Ok(NutritionRecord {
            food_name: text(field("food_name")?),
            calories: calories(field("calories")?)?,
            protein: amount("protein", field("protein")?)?,
            carbs: amount("carbs", field("carbs")?)?,
            fats: amount("fats", field("fats")?)?,
            vitamins: text(field("vitamins")?),
            minerals: text(field("minerals")?),
            image_reference: None,
        })
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn amount(field: &'static str, v: &Value) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidAmount {
        field,
        value: v.to_string(),
    };
    let n = match v {
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if !n.is_finite() || n < 0.0 {
        return Err(invalid());
    }
    Ok(n)
}

// Fractional calories are truncated.
fn calories(v: &Value) -> Result<u32, ValidationError> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).map_err(|_| ValidationError::InvalidAmount {
            field: "calories",
            value: v.to_string(),
        });
    }
    let n = amount("calories", v)?.trunc();
    if n > f64::from(u32::MAX) {
        return Err(ValidationError::InvalidAmount {
            field: "calories",
            value: v.to_string(),
        });
    }
    Ok(n as u32)
}
