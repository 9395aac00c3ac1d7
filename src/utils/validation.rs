//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use crate::seating::SeatingError;

/// Entity names: sections and tables
pub const MAX_NAME_LEN: usize = 200;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> Result<(), SeatingError> {
    if value.trim().is_empty() {
        return Err(SeatingError::Validation(format!(
            "{field} must not be empty"
        )));
    }
    if value.len() > max_len {
        return Err(SeatingError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}
