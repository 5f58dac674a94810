//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a numeric setting lies within `min..=max`.
pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<(), String>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        Err(format!("{} must be between {} and {}", field_name, min, max))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("hi", "content").is_ok());
        assert_eq!(
            validate_not_empty("   ", "content").unwrap_err(),
            "content cannot be empty"
        );
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(60u64, 1, 600, "PROVIDER_TIMEOUT_SECS").is_ok());
        assert!(validate_range(0u64, 1, 600, "PROVIDER_TIMEOUT_SECS").is_err());
    }
}
