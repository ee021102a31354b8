//! Serializable snapshots of validation state.

use serde::{Deserialize, Serialize};

/// State of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    /// Control name.
    pub key: String,
    /// Control identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Result of the last validation.
    pub valid: bool,
    /// Failure messages of the last validation.
    #[serde(default)]
    pub messages: Vec<String>,
}

/// State of a whole validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Result of the last `validate_all`.
    pub all_valid: bool,
    /// Per-field state, in field order.
    pub fields: Vec<FieldReport>,
}

impl ValidationReport {
    /// Fields that failed.
    pub fn invalid_fields(&self) -> impl Iterator<Item = &FieldReport> {
        self.fields.iter().filter(|f| !f.valid)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
