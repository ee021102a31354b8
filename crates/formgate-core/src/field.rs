//! Field model: one validated input with its tests and current state.

use crate::collaborator::{Control, FieldId, FieldValue, Wrapper};
use crate::error::ConfigError;
use crate::hooks::FieldHook;
use crate::registry::TestRegistry;
use crate::validator::FormValidator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// One entry of a field's test list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Registry name of the test.
    pub name: String,
    /// Test parameter (bound, pattern, other field name...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Message recorded when the test fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestSpec {
    /// Create a test entry with no parameter or message.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter: None,
            message: None,
        }
    }

    /// Set the parameter.
    pub fn with_parameter(mut self, parameter: &str) -> Self {
        self.parameter = Some(parameter.to_string());
        self
    }

    /// Set the failure message.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Construction input for a [`Field`].
///
/// `input`, `wrapper` and `tests` are mandatory; building a validator from a
/// config missing any of them fails with a [`ConfigError`].
#[derive(Default)]
pub struct FieldConfig {
    input: Option<Box<dyn Control>>,
    wrapper: Option<Box<dyn Wrapper>>,
    tests: Option<Vec<TestSpec>>,
    group: Option<String>,
    dependent_field_key: Option<String>,
    validate_when_disabled: bool,
    on_valid: Option<FieldHook>,
    on_invalid: Option<FieldHook>,
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("input", &self.input.as_ref().map(|c| c.name().to_string()))
            .field("has_wrapper", &self.wrapper.is_some())
            .field("tests", &self.tests)
            .field("group", &self.group)
            .field("dependent_field_key", &self.dependent_field_key)
            .field("validate_when_disabled", &self.validate_when_disabled)
            .finish_non_exhaustive()
    }
}

impl FieldConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input control.
    pub fn input(mut self, input: impl Control + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Set the visual wrapper.
    pub fn wrapper(mut self, wrapper: impl Wrapper + 'static) -> Self {
        self.wrapper = Some(Box::new(wrapper));
        self
    }

    /// Replace the test list.
    pub fn tests(mut self, tests: Vec<TestSpec>) -> Self {
        self.tests = Some(tests);
        self
    }

    /// Append one test.
    pub fn test(mut self, test: TestSpec) -> Self {
        self.tests.get_or_insert_with(Vec::new).push(test);
        self
    }

    /// Set the group label.
    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Re-validate this field whenever the named control passes a
    /// blur-triggered validation.
    pub fn depends_on(mut self, name: &str) -> Self {
        self.dependent_field_key = Some(name.to_string());
        self
    }

    /// Run tests even while the control is disabled.
    pub fn validate_when_disabled(mut self, enabled: bool) -> Self {
        self.validate_when_disabled = enabled;
        self
    }

    /// Called after the field passes validation or is devalidated.
    pub fn on_valid(mut self, hook: impl Fn(&FormValidator, &Field) + 'static) -> Self {
        self.on_valid = Some(Rc::new(hook));
        self
    }

    /// Called after the field fails validation.
    pub fn on_invalid(mut self, hook: impl Fn(&FormValidator, &Field) + 'static) -> Self {
        self.on_invalid = Some(Rc::new(hook));
        self
    }

    pub(crate) fn build(
        self,
        index: usize,
        id: FieldId,
        registry: &TestRegistry,
        strict: bool,
    ) -> Result<Field, ConfigError> {
        let wrapper = self
            .wrapper
            .ok_or(ConfigError::MissingWrapper { field: index })?;
        let input = self.input.ok_or(ConfigError::MissingInput { field: index })?;
        let tests = self.tests.ok_or(ConfigError::MissingTests { field: index })?;

        for (test_index, test) in tests.iter().enumerate() {
            if test.name.trim().is_empty() {
                return Err(ConfigError::MissingTestName {
                    field: index,
                    test: test_index,
                });
            }
            if strict && !registry.contains(&test.name) {
                return Err(ConfigError::UnknownTest {
                    field: index,
                    name: test.name.clone(),
                });
            }
        }

        Ok(Field {
            id,
            input,
            wrapper,
            tests,
            group: self.group,
            dependent_field_key: self.dependent_field_key,
            validate_when_disabled: self.validate_when_disabled,
            is_valid: true,
            messages: Vec::new(),
            on_valid: self.on_valid,
            on_invalid: self.on_invalid,
        })
    }
}

/// A validated input.
pub struct Field {
    pub(crate) id: FieldId,
    pub(crate) input: Box<dyn Control>,
    pub(crate) wrapper: Box<dyn Wrapper>,
    pub(crate) tests: Vec<TestSpec>,
    pub(crate) group: Option<String>,
    pub(crate) dependent_field_key: Option<String>,
    pub(crate) validate_when_disabled: bool,
    pub(crate) is_valid: bool,
    pub(crate) messages: Vec<String>,
    pub(crate) on_valid: Option<FieldHook>,
    pub(crate) on_invalid: Option<FieldHook>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("tests", &self.tests)
            .field("group", &self.group)
            .field("dependent_field_key", &self.dependent_field_key)
            .field("validate_when_disabled", &self.validate_when_disabled)
            .field("is_valid", &self.is_valid)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl Field {
    /// Engine-assigned identity.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Name of the bound control.
    pub fn key(&self) -> &str {
        self.input.name()
    }

    /// The bound control.
    pub fn input(&self) -> &dyn Control {
        self.input.as_ref()
    }

    /// Current value of the bound control.
    pub fn value(&self) -> FieldValue {
        self.input.value()
    }

    /// Configured tests, in evaluation order.
    pub fn tests(&self) -> &[TestSpec] {
        &self.tests
    }

    /// Whether a test with this name is configured.
    pub fn has_test(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t.name == name)
    }

    /// Group label.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Name of the control this field cascades from.
    pub fn dependent_field_key(&self) -> Option<&str> {
        self.dependent_field_key.as_deref()
    }

    /// Whether tests run while the control is disabled.
    pub fn validates_when_disabled(&self) -> bool {
        self.validate_when_disabled
    }

    /// Result of the last validation.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Failure messages of the last validation.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// First failure message.
    pub fn first_message(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    pub(crate) fn in_group(&self, group: Option<&str>) -> bool {
        self.group.as_deref() == group
    }

    pub(crate) fn skips_validation(&self) -> bool {
        !self.validate_when_disabled && self.input.is_disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryControl, MemoryWrapper};

    fn build(config: FieldConfig) -> Result<Field, ConfigError> {
        config.build(0, FieldId::new(1), &TestRegistry::builtin(), false)
    }

    #[test]
    fn test_test_spec_builder() {
        let spec = TestSpec::new("min-length")
            .with_parameter("3")
            .with_message("Too short");
        assert_eq!(spec.name, "min-length");
        assert_eq!(spec.parameter.as_deref(), Some("3"));
        assert_eq!(spec.message.as_deref(), Some("Too short"));
    }

    #[test]
    fn test_field_config_defaults() {
        let field = build(
            FieldConfig::new()
                .input(MemoryControl::text("name"))
                .wrapper(MemoryWrapper::new())
                .tests(vec![]),
        )
        .unwrap();

        assert_eq!(field.key(), "name");
        assert_eq!(field.group(), None);
        assert_eq!(field.dependent_field_key(), None);
        assert!(!field.validates_when_disabled());
        assert!(field.is_valid());
        assert!(field.messages().is_empty());
    }

    #[test]
    fn test_field_config_missing_parts() {
        let err = build(FieldConfig::new().input(MemoryControl::text("a")).tests(vec![]));
        assert_eq!(err.unwrap_err(), ConfigError::MissingWrapper { field: 0 });

        let err = build(FieldConfig::new().wrapper(MemoryWrapper::new()).tests(vec![]));
        assert_eq!(err.unwrap_err(), ConfigError::MissingInput { field: 0 });

        let err = build(
            FieldConfig::new()
                .input(MemoryControl::text("a"))
                .wrapper(MemoryWrapper::new()),
        );
        assert_eq!(err.unwrap_err(), ConfigError::MissingTests { field: 0 });
    }

    #[test]
    fn test_field_config_blank_test_name() {
        let err = build(
            FieldConfig::new()
                .input(MemoryControl::text("a"))
                .wrapper(MemoryWrapper::new())
                .test(TestSpec::new("required"))
                .test(TestSpec::new(" ")),
        );
        assert_eq!(
            err.unwrap_err(),
            ConfigError::MissingTestName { field: 0, test: 1 }
        );
    }

    #[test]
    fn test_field_config_strict_unknown_test() {
        let config = FieldConfig::new()
            .input(MemoryControl::text("a"))
            .wrapper(MemoryWrapper::new())
            .test(TestSpec::new("postcode"));
        let err = config.build(4, FieldId::new(1), &TestRegistry::builtin(), true);
        assert_eq!(
            err.unwrap_err(),
            ConfigError::UnknownTest {
                field: 4,
                name: "postcode".to_string()
            }
        );
    }

    #[test]
    fn test_field_group_and_dependency() {
        let field = build(
            FieldConfig::new()
                .input(MemoryControl::text("confirm"))
                .wrapper(MemoryWrapper::new())
                .test(TestSpec::new("matches").with_parameter("password"))
                .group("account")
                .depends_on("password"),
        )
        .unwrap();

        assert!(field.in_group(Some("account")));
        assert!(!field.in_group(None));
        assert_eq!(field.dependent_field_key(), Some("password"));
        assert!(field.has_test("matches"));
        assert!(!field.has_test("required"));
    }

    #[test]
    fn test_field_skips_validation_when_disabled() {
        let control = MemoryControl::text("a");
        let field = build(
            FieldConfig::new()
                .input(control.clone())
                .wrapper(MemoryWrapper::new())
                .tests(vec![]),
        )
        .unwrap();
        assert!(!field.skips_validation());
        control.set_disabled(true);
        assert!(field.skips_validation());
    }
}
