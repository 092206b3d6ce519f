//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! 校验在 API handler 层完成，仓储层假定输入已经合法。

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Customer names
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone numbers etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Party size upper bound (the join form offers up to 12)
pub const MAX_PARTY_SIZE: i32 = 12;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that a party size is within 1..=MAX_PARTY_SIZE.
pub fn validate_party_size(party_size: i32) -> Result<(), AppError> {
    if party_size < 1 {
        return Err(AppError::validation("party_size must be at least 1"));
    }
    if party_size > MAX_PARTY_SIZE {
        return Err(AppError::validation(format!(
            "party_size is too large (max {MAX_PARTY_SIZE})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Alice", "customer_name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("", "customer_name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("   ", "customer_name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "customer_name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_party_size_bounds() {
        assert!(validate_party_size(1).is_ok());
        assert!(validate_party_size(12).is_ok());
        assert!(validate_party_size(0).is_err());
        assert!(validate_party_size(-2).is_err());
        assert!(validate_party_size(13).is_err());
    }
}
