//! Type-aware parsing of raw form values.

use serde_json::Value;

use super::schema::{SettingDescriptor, SettingKind, SettingOption};
use crate::error::FieldError;

/// Raw values that leave a checkbox unchecked when a host submits them explicitly.
const UNCHECKED_VALUES: &[&str] = &["false", "off", "0", "no"];

/// Coerce the raw form value of one setting to its declared type.
///
/// `raw` is `None` when the form did not submit the field at all, which for a
/// checkbox means "unchecked".
pub fn coerce(descriptor: &SettingDescriptor, raw: Option<&str>) -> Result<Value, FieldError> {
    match &descriptor.kind {
        SettingKind::Boolean => Ok(Value::Bool(is_checked(raw))),
        SettingKind::Int => coerce_int(raw.unwrap_or_default()),
        SettingKind::Float => coerce_float(raw.unwrap_or_default()),
        SettingKind::Choice { options } => coerce_choice(options, raw.unwrap_or_default()),
    }
}

fn is_checked(raw: Option<&str>) -> bool {
    match raw {
        None => false,
        Some(raw) => {
            let raw = raw.trim();
            !UNCHECKED_VALUES
                .iter()
                .any(|unchecked| raw.eq_ignore_ascii_case(unchecked))
        }
    }
}

fn coerce_int(raw: &str) -> Result<Value, FieldError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(Value::from(value));
    }

    match trimmed.parse::<f64>() {
        // "3.0" names a whole number; "3.5" would need rounding and is refused
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 => {
            Ok(Value::from(value as i64))
        }
        Ok(_) => Err(FieldError::NotAnInteger {
            raw: raw.to_string(),
        }),
        Err(_) => Err(FieldError::NotANumber {
            raw: raw.to_string(),
        }),
    }
}

fn coerce_float(raw: &str) -> Result<Value, FieldError> {
    let value = raw.trim().parse::<f64>().map_err(|_| FieldError::NotANumber {
        raw: raw.to_string(),
    })?;

    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| FieldError::NotFinite {
            raw: raw.to_string(),
        })
}

fn coerce_choice(options: &[SettingOption], raw: &str) -> Result<Value, FieldError> {
    let trimmed = raw.trim();
    options
        .iter()
        .find(|option| option.value_text() == trimmed)
        .map(|option| option.value.clone())
        .ok_or_else(|| FieldError::UnknownOption {
            raw: raw.to_string(),
        })
}
