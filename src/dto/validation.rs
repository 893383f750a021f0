//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dto::admin::{CountryUpdateRequest, EnergyUpdateRequest, UpdateMode};

/// Validates that a country code is exactly two ASCII letters.
///
/// Case-insensitive: codes are normalized to upper-case later, at the
/// storage boundary.
pub fn validate_country_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        let mut err = ValidationError::new("country_code_format");
        err.message = Some("countryCode must be a 2-letter ISO code".into());
        return Err(err);
    }
    Ok(())
}

/// Mode/value coherence for country updates: positive deltas, non-negative
/// absolute values (counts have no upper bound).
pub fn validate_country_update(request: &CountryUpdateRequest) -> Result<(), ValidationError> {
    match request.mode {
        UpdateMode::Increment => require_positive_increment(request.value),
        UpdateMode::Absolute => {
            if request.value < 0 {
                let mut err = ValidationError::new("absolute_negative");
                err.message = Some("Absolute value must be non-negative".into());
                return Err(err);
            }
            Ok(())
        }
    }
}

/// Mode/value coherence for energy updates: positive deltas, absolute values
/// within `[0, 100]`.
pub fn validate_energy_update(request: &EnergyUpdateRequest) -> Result<(), ValidationError> {
    match request.mode {
        UpdateMode::Increment => require_positive_increment(request.value),
        UpdateMode::Absolute => {
            if !(0..=100).contains(&request.value) {
                let mut err = ValidationError::new("absolute_out_of_range");
                err.message = Some("Absolute value must be between 0 and 100".into());
                return Err(err);
            }
            Ok(())
        }
    }
}

fn require_positive_increment(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        let mut err = ValidationError::new("increment_not_positive");
        err.message = Some("Increment value must be positive".into());
        return Err(err);
    }
    Ok(())
}
