//! The validator instance: fields, collaborators, settings and flags.
//!
//! Behavior is split across modules by concern:
//! - `engine`: validate / devalidate operations
//! - `orchestrator`: event handlers
//! - `lifecycle`: init / destroy and dynamic membership

use crate::collaborator::{FieldId, FieldValue, FormContainer, SubmitTrigger, Submitter, ValueLookup};
use crate::error::ConfigError;
use crate::field::Field;
use crate::hooks::Hooks;
use crate::options::{ValidatorOptions, ValidatorSettings};
use crate::registry::TestRegistry;
use crate::report::{FieldReport, ValidationReport};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Form validation engine bound to a set of fields.
pub struct FormValidator {
    pub(crate) fields: Vec<Field>,
    pub(crate) form: Option<Box<dyn FormContainer>>,
    pub(crate) submit_trigger: Option<Box<dyn SubmitTrigger>>,
    pub(crate) submitters: Vec<Box<dyn Submitter>>,
    pub(crate) lookup: Option<Rc<dyn ValueLookup>>,
    pub(crate) registry: Arc<TestRegistry>,
    pub(crate) settings: ValidatorSettings,
    pub(crate) hooks: Hooks,
    pub(crate) next_id: u64,
    pub(crate) is_all_valid: bool,
    pub(crate) is_initialized: bool,
    pub(crate) is_submitted: bool,
}

impl fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValidator")
            .field("fields", &self.fields)
            .field("has_form", &self.form.is_some())
            .field("submitters", &self.submitters.len())
            .field("settings", &self.settings)
            .field("is_all_valid", &self.is_all_valid)
            .field("is_initialized", &self.is_initialized)
            .field("is_submitted", &self.is_submitted)
            .finish_non_exhaustive()
    }
}

impl FormValidator {
    /// Build a validator. Nothing is wired until [`FormValidator::init`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found among the field configs.
    pub fn new(options: ValidatorOptions) -> Result<Self, ConfigError> {
        let registry = options
            .registry
            .unwrap_or_else(|| Arc::new(TestRegistry::builtin()));
        let strict = options.settings.strict_tests;

        let mut next_id = 0;
        let mut fields = Vec::with_capacity(options.fields.len());
        for (index, config) in options.fields.into_iter().enumerate() {
            next_id += 1;
            fields.push(config.build(index, FieldId::new(next_id), &registry, strict)?);
        }

        tracing::debug!(fields = fields.len(), strict, "validator created");

        Ok(Self {
            fields,
            form: options.form,
            submit_trigger: options.submit_trigger,
            submitters: options.submitters,
            lookup: options.lookup,
            registry,
            settings: options.settings,
            hooks: options.hooks,
            next_id,
            is_all_valid: true,
            is_initialized: false,
            is_submitted: false,
        })
    }

    /// Fields in validation order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field by identity.
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Field by control name.
    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Test registry in use.
    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    /// Plain settings.
    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Result of the last `validate_all`.
    pub fn is_all_valid(&self) -> bool {
        self.is_all_valid
    }

    /// Whether `init` ran (and `destroy` has not since).
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Whether a submission passed validation.
    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    /// Snapshot of every field's state.
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            all_valid: self.is_all_valid,
            fields: self
                .fields
                .iter()
                .map(|f| FieldReport {
                    key: f.key().to_string(),
                    id: f.input.id().map(str::to_string),
                    group: f.group.clone(),
                    valid: f.is_valid,
                    messages: f.messages.clone(),
                })
                .collect(),
        }
    }

    pub(crate) fn index_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Id the next added field will get; taken with [`Self::commit_id`].
    pub(crate) fn next_field_id(&self) -> FieldId {
        FieldId::new(self.next_id + 1)
    }

    pub(crate) fn commit_id(&mut self) {
        self.next_id += 1;
    }
}

/// Resolves names and ids against the validator's own fields.
pub(crate) struct FieldsLookup<'a>(pub(crate) &'a [Field]);

impl ValueLookup for FieldsLookup<'_> {
    fn by_name(&self, name: &str) -> Option<FieldValue> {
        self.0.iter().find(|f| f.key() == name).map(Field::value)
    }

    fn by_id(&self, id: &str) -> Option<FieldValue> {
        self.0
            .iter()
            .find(|f| f.input.id() == Some(id))
            .map(Field::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldConfig, TestSpec};
    use crate::memory::{MemoryControl, MemoryWrapper};

    fn text_field(name: &str) -> FieldConfig {
        FieldConfig::new()
            .input(MemoryControl::text(name).with_id(name))
            .wrapper(MemoryWrapper::new())
            .test(TestSpec::new("required"))
    }

    #[test]
    fn test_new_assigns_unique_ids() {
        let validator = FormValidator::new(
            ValidatorOptions::new()
                .field(text_field("a"))
                .field(text_field("b")),
        )
        .unwrap();

        assert_eq!(validator.field_count(), 2);
        let ids: Vec<_> = validator.fields().iter().map(Field::id).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(validator.field(ids[1]).map(Field::key), Some("b"));
        assert!(validator.is_all_valid());
        assert!(!validator.is_initialized());
        assert!(!validator.is_submitted());
    }

    #[test]
    fn test_new_reports_offending_field() {
        let err = FormValidator::new(
            ValidatorOptions::new()
                .field(text_field("a"))
                .field(FieldConfig::new().input(MemoryControl::text("b")).tests(vec![])),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingWrapper { field: 1 });
    }

    #[test]
    fn test_new_strict_rejects_unknown_tests() {
        let options = || {
            ValidatorOptions::new().field(
                FieldConfig::new()
                    .input(MemoryControl::text("zip"))
                    .wrapper(MemoryWrapper::new())
                    .test(TestSpec::new("postcode")),
            )
        };
        assert!(FormValidator::new(options()).is_ok());
        assert!(matches!(
            FormValidator::new(options().strict_tests(true)),
            Err(ConfigError::UnknownTest { field: 0, .. })
        ));
    }

    #[test]
    fn test_fields_lookup() {
        let validator = FormValidator::new(
            ValidatorOptions::new()
                .field(text_field("first"))
                .field(text_field("second")),
        )
        .unwrap();
        let lookup = FieldsLookup(validator.fields());
        assert_eq!(lookup.by_name("second"), Some(FieldValue::text("")));
        assert_eq!(lookup.by_id("first"), Some(FieldValue::text("")));
        assert_eq!(lookup.by_name("third"), None);
    }

    #[test]
    fn test_report_snapshot() {
        let validator = FormValidator::new(
            ValidatorOptions::new().field(text_field("email").group("account")),
        )
        .unwrap();
        let report = validator.report();
        assert!(report.all_valid);
        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].key, "email");
        assert_eq!(report.fields[0].id.as_deref(), Some("email"));
        assert_eq!(report.fields[0].group.as_deref(), Some("account"));
    }
}
