//! Request validation shared by the handlers.
//!
//! Request bodies derive [`validator::Validate`]; the field checks below cover what the
//! built-in validators do not (blank strings, nil ids, money amounts). A failed validation
//! becomes a 400 `VALIDATION_ERROR` envelope before any procedure is called.

use std::borrow::Cow;
use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::assembler::naming::to_camel_case;
use crate::error::ApiError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "This field is required"));
    }
    Ok(())
}

pub fn not_nil(value: &Uuid) -> Result<(), ValidationError> {
    if value.is_nil() {
        return Err(invalid("required", "A non-empty id is required"));
    }
    Ok(())
}

pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("range", "Must not be negative"));
    }
    Ok(())
}

pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(invalid("range", "Must be greater than zero"));
    }
    Ok(())
}

/// Path project numbers are positive.
pub fn project_no(value: i32) -> Result<i32, ApiError> {
    if value <= 0 {
        return Err(ApiError::validation_error("Invalid project number", None));
    }
    Ok(value)
}

/// Wire-named field -> first message for that field.
pub fn field_errors(errors: &ValidationErrors) -> HashMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid value".to_string());
            (to_camel_case(&field), message)
        })
        .collect()
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation_error("Validation failed", Some(field_errors(&errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::str::FromStr;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Payment {
        #[validate(custom(function = "positive"))]
        amount: Decimal,
        #[validate(custom(function = "not_blank"))]
        tally_entry_number: String,
        #[validate(custom(function = "not_nil"))]
        user_id: Uuid,
    }

    #[test]
    fn collects_every_failing_field_in_wire_names() {
        let payment = Payment {
            amount: Decimal::ZERO,
            tally_entry_number: "   ".to_string(),
            user_id: Uuid::nil(),
        };
        let errors = field_errors(&payment.validate().unwrap_err());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["amount"], "Must be greater than zero");
        assert_eq!(errors["tallyEntryNumber"], "This field is required");
        assert!(errors.contains_key("userId"));
    }

    #[test]
    fn valid_payment_passes() {
        let payment = Payment {
            amount: Decimal::from_str("10.50").unwrap(),
            tally_entry_number: "T-101".to_string(),
            user_id: Uuid::new_v4(),
        };
        assert!(payment.validate().is_ok());
    }

    #[test]
    fn zero_is_not_negative() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn project_numbers_must_be_positive() {
        assert_eq!(project_no(3).unwrap(), 3);
        assert_eq!(project_no(0).unwrap_err().status_code(), 400);
        assert_eq!(project_no(-4).unwrap_err().status_code(), 400);
    }
}
