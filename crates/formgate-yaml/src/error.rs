//! Error types for manifest loading.

use formgate_core::ConfigError;
use std::fmt;

/// Error type for manifest parsing and building.
#[derive(Debug)]
pub enum ParseError {
    /// YAML parsing error
    Yaml(serde_yaml_ng::Error),
    /// Structural check failed
    Validation(String),
    /// Missing required field
    MissingField(String),
    /// Invalid value
    InvalidValue {
        /// Field name
        field: String,
        /// Error message
        message: String,
    },
    /// Validator construction failed
    Config(ConfigError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml(e) => write!(f, "YAML error: {e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::MissingField(field) => write!(f, "Missing required field: {field}"),
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Yaml(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml_ng::Error> for ParseError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        Self::Yaml(e)
    }
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::MissingField("fields".to_string());
        assert_eq!(err.to_string(), "Missing required field: fields");

        let err = ParseError::InvalidValue {
            field: "terms".to_string(),
            message: "unknown option 'maybe'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'terms': unknown option 'maybe'"
        );

        let err = ParseError::Validation("duplicate field name 'email'".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: duplicate field name 'email'"
        );
    }

    #[test]
    fn test_config_error_source() {
        use std::error::Error;

        let err = ParseError::from(ConfigError::MissingTests { field: 2 });
        assert!(err.to_string().starts_with("Configuration error: "));
        assert!(err.source().is_some());
    }
}
