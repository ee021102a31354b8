//! Error types for formgate-core.

use thiserror::Error;

/// Errors raised while constructing a validator or adding a field.
///
/// Validation failures are never reported through this type: a field that
/// fails its tests is ordinary state (see [`crate::Field::messages`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Field has no wrapper (visual container) attached.
    #[error("field {field}: \"wrapper\" option must be provided")]
    MissingWrapper {
        /// Index of the offending field.
        field: usize,
    },

    /// Field has no input control attached.
    #[error("field {field}: \"input\" option must be provided")]
    MissingInput {
        /// Index of the offending field.
        field: usize,
    },

    /// Field has no test list.
    #[error("field {field}: \"tests\" option must be provided")]
    MissingTests {
        /// Index of the offending field.
        field: usize,
    },

    /// A test entry has an empty name.
    #[error("field {field}, test {test}: \"name\" option must be a non-empty string")]
    MissingTestName {
        /// Index of the offending field.
        field: usize,
        /// Index of the offending test within the field.
        test: usize,
    },

    /// A test name is not in the registry (strict mode only).
    #[error("field {field}: unknown test \"{name}\"")]
    UnknownTest {
        /// Index of the offending field.
        field: usize,
        /// The unresolved test name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingWrapper { field: 2 };
        assert_eq!(err.to_string(), "field 2: \"wrapper\" option must be provided");

        let err = ConfigError::MissingTestName { field: 0, test: 3 };
        assert_eq!(
            err.to_string(),
            "field 0, test 3: \"name\" option must be a non-empty string"
        );

        let err = ConfigError::UnknownTest {
            field: 1,
            name: "postcode".to_string(),
        };
        assert_eq!(err.to_string(), "field 1: unknown test \"postcode\"");
    }
}
