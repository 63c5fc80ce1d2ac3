//! Coercion of loosely typed input
//!
//! Host form handlers receive amounts and payors as JSON values. These
//! helpers turn them into the typed arguments the engine takes, reporting a
//! type error (distinct from a range error) for anything that is not an
//! integer. Floats are rejected even when they have no fractional part.

use serde_json::Value;

use core_kernel::UserId;
use crate::error::BillingError;

/// Reads an integer amount in minor units
///
/// # Errors
///
/// - `InvalidType` for null, floats, booleans, strings, arrays and objects
/// - `AmountOverflow` for integers outside the `i64` range
pub fn integer_from_value(field: &'static str, value: &Value) -> Result<i64, BillingError> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => {
            number.as_i64().ok_or_else(|| {
                BillingError::AmountOverflow(format!("{} = {} exceeds the supported range", field, number))
            })
        }
        other => Err(invalid_type(field, "integer", other)),
    }
}

/// Reads a positive liability weight
///
/// # Errors
///
/// - `InvalidType` if the value is not an integer
/// - `NonPositiveWeight` if it is zero or negative
pub fn weight_from_value(value: &Value) -> Result<i64, BillingError> {
    let weight = integer_from_value("weight", value)?;
    if weight <= 0 {
        return Err(BillingError::NonPositiveWeight(weight));
    }
    Ok(weight)
}

/// Reads a payor id, with or without its `USR-` prefix
///
/// # Errors
///
/// Returns `InvalidType` when no payor is given or the id is malformed
pub fn payor_from_value(value: &Value) -> Result<UserId, BillingError> {
    match value {
        Value::String(raw) => raw.trim().parse::<UserId>().map_err(|_| BillingError::InvalidType {
            field: "payor",
            expected: "user id",
            found: format!("malformed id {:?}", raw),
        }),
        other => Err(invalid_type("payor", "user id", other)),
    }
}

fn invalid_type(field: &'static str, expected: &'static str, value: &Value) -> BillingError {
    BillingError::InvalidType {
        field,
        expected,
        found: describe(value).to_string(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_accepts_integers() {
        assert_eq!(integer_from_value("charge", &json!(20)).unwrap(), 20);
        assert_eq!(integer_from_value("amount", &json!(-50)).unwrap(), -50);
    }

    #[test]
    fn test_rejects_non_integers_as_type_errors() {
        for value in [json!(null), json!(""), json!("abc"), json!(123.45), json!(12.0), json!(true), json!([1])] {
            let err = integer_from_value("charge", &value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Type, "{:?} should be a type error", value);
        }
    }

    #[test]
    fn test_huge_integer_is_range_error() {
        let err = integer_from_value("charge", &json!(u64::MAX)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_weight_must_be_positive() {
        assert_eq!(weight_from_value(&json!(25)).unwrap(), 25);
        assert!(matches!(weight_from_value(&json!(0)), Err(BillingError::NonPositiveWeight(0))));
        assert_eq!(weight_from_value(&json!(2.5)).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn test_payor_parsing() {
        let user = UserId::new();
        assert_eq!(payor_from_value(&json!(user.to_string())).unwrap(), user);

        let missing = payor_from_value(&json!(null)).unwrap_err();
        assert!(matches!(missing, BillingError::InvalidType { field: "payor", .. }));

        assert_eq!(payor_from_value(&json!("USR-nope")).unwrap_err().kind(), ErrorKind::Type);
    }
}
