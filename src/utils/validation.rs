use chrono::{DateTime, Utc};
use validator::ValidationError;

pub fn future_timestamp(value: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *value > super::time::now() {
        Ok(())
    } else {
        let mut err = ValidationError::new("future_timestamp");
        err.message = Some("must be in the future".into());
        Err(err)
    }
}

pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("non_blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

pub fn non_negative_decimal(value: &rust_decimal::Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        Err(err)
    } else {
        Ok(())
    }
}
