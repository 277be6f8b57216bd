//! Error types for risk engine

use thiserror::Error;

/// Message reported when an evaluation carries no usable feature
pub const NO_USABLE_INPUT_MESSAGE: &str = "at least one feature value is required";

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Every feature was absent or blank
    #[error("{}", NO_USABLE_INPUT_MESSAGE)]
    NoUsableInput,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_usable_input_message() {
        assert_eq!(
            Error::NoUsableInput.to_string(),
            "at least one feature value is required"
        );
    }

    #[test]
    fn test_invalid_config_message() {
        let err = Error::InvalidConfig("spread must be non-negative".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: spread must be non-negative"
        );
    }
}
