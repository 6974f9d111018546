//! Domain-level errors

use thiserror::Error;

/// Errors raised while validating caller input, before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Coordinate string or values out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Value outside an enumerated option set
    #[error("Invalid value for {option}: '{value}'. Should be one of {allowed}")]
    InvalidOption {
        /// Name of the option (e.g. "transportMode")
        option: &'static str,
        /// The rejected value
        value: String,
        /// Human-readable list of accepted values
        allowed: &'static str,
    },

    /// Departure time neither "any" nor ISO 8601
    #[error("Invalid departure time: {0}")]
    InvalidDateTime(String),
}

impl DomainError {
    /// Create an invalid option error
    pub fn invalid_option(option: &'static str, value: impl Into<String>, allowed: &'static str) -> Self {
        Self::InvalidOption {
            option,
            value: value.into(),
            allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_option_message_names_allowed_values() {
        let err = DomainError::invalid_option("transportMode", "rocket", "'car' or 'truck'");
        assert_eq!(
            err.to_string(),
            "Invalid value for transportMode: 'rocket'. Should be one of 'car' or 'truck'"
        );
    }

    #[test]
    fn invalid_coordinate_message() {
        let err = DomainError::InvalidCoordinate("abc".to_string());
        assert_eq!(err.to_string(), "Invalid coordinate: abc");
    }

    #[test]
    fn invalid_datetime_message() {
        let err = DomainError::InvalidDateTime("yesterday".to_string());
        assert_eq!(err.to_string(), "Invalid departure time: yesterday");
    }
}
