//! Validator configuration.

use crate::collaborator::{FormContainer, SubmitTrigger, Submitter, ValueLookup};
use crate::field::FieldConfig;
use crate::hooks::Hooks;
use crate::registry::TestRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Plain settings of a validator; serializable so manifests can carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Move focus to the first invalid field after `validate_all`.
    pub set_focus: bool,
    /// Validate on blur and reset markers on focus.
    pub live_validation: bool,
    /// Intercept submission of the bound form.
    pub validation_on_submit: bool,
    /// Wrapper class for failed fields.
    pub error_class: String,
    /// Wrapper class for passing fields.
    pub success_class: String,
    /// Form class once submission went through.
    pub submit_class: String,
    /// Reject unknown test names at construction instead of skipping them.
    pub strict_tests: bool,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            set_focus: true,
            live_validation: true,
            validation_on_submit: true,
            error_class: "has-error".to_string(),
            success_class: "has-success".to_string(),
            submit_class: "has-submitted".to_string(),
            strict_tests: false,
        }
    }
}

/// Everything needed to construct a [`crate::FormValidator`].
#[derive(Default)]
pub struct ValidatorOptions {
    pub(crate) fields: Vec<FieldConfig>,
    pub(crate) form: Option<Box<dyn FormContainer>>,
    pub(crate) submit_trigger: Option<Box<dyn SubmitTrigger>>,
    pub(crate) submitters: Vec<Box<dyn Submitter>>,
    pub(crate) lookup: Option<Rc<dyn ValueLookup>>,
    pub(crate) registry: Option<Arc<TestRegistry>>,
    pub(crate) settings: ValidatorSettings,
    pub(crate) hooks: Hooks,
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field("fields", &self.fields)
            .field("has_form", &self.form.is_some())
            .field("has_submit_trigger", &self.submit_trigger.is_some())
            .field("submitters", &self.submitters.len())
            .field("has_lookup", &self.lookup.is_some())
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl ValidatorOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the field list.
    pub fn fields(mut self, fields: Vec<FieldConfig>) -> Self {
        self.fields = fields;
        self
    }

    /// Bind a form.
    pub fn form(mut self, form: impl FormContainer + 'static) -> Self {
        self.form = Some(Box::new(form));
        self
    }

    /// Set the real submit control proxies forward to.
    pub fn submit_trigger(mut self, trigger: impl SubmitTrigger + 'static) -> Self {
        self.submit_trigger = Some(Box::new(trigger));
        self
    }

    /// Add a proxy submit control.
    pub fn submitter(mut self, submitter: impl Submitter + 'static) -> Self {
        self.submitters.push(Box::new(submitter));
        self
    }

    /// Resolve cross-field values through `lookup` instead of the
    /// validator's own fields.
    pub fn lookup(mut self, lookup: Rc<dyn ValueLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Use a custom test registry.
    pub fn registry(mut self, registry: Arc<TestRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace all plain settings.
    pub fn settings(mut self, settings: ValidatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace all hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Toggle focusing the first invalid field.
    pub fn set_focus(mut self, enabled: bool) -> Self {
        self.settings.set_focus = enabled;
        self
    }

    /// Toggle live (blur) validation.
    pub fn live_validation(mut self, enabled: bool) -> Self {
        self.settings.live_validation = enabled;
        self
    }

    /// Toggle submit interception.
    pub fn validation_on_submit(mut self, enabled: bool) -> Self {
        self.settings.validation_on_submit = enabled;
        self
    }

    /// Toggle strict test-name checking.
    pub fn strict_tests(mut self, enabled: bool) -> Self {
        self.settings.strict_tests = enabled;
        self
    }
}
