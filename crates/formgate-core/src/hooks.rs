//! Lifecycle and outcome callbacks.
//!
//! Hooks receive the validator by shared reference, so they can read field
//! state but never mutate it.

use crate::collaborator::SubmitEvent;
use crate::field::Field;
use crate::validator::FormValidator;
use std::fmt;
use std::rc::Rc;

/// Callback taking the validator.
pub type ValidatorHook = Rc<dyn Fn(&FormValidator)>;

/// Callback taking the validator and one field.
pub type FieldHook = Rc<dyn Fn(&FormValidator, &Field)>;

/// Callback taking the validator and the originating submit event.
pub type SubmitHook = Rc<dyn Fn(&FormValidator, &SubmitEvent)>;

/// Validator-wide hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    /// After `init` completes.
    pub on_init: Option<ValidatorHook>,
    /// After `destroy` completes.
    pub on_destroy: Option<ValidatorHook>,
    /// After `validate_all` when every field passed.
    pub on_all_valid: Option<ValidatorHook>,
    /// After `validate_all` when a field failed.
    pub on_has_invalid: Option<ValidatorHook>,
    /// After a submit attempt passed validation.
    pub on_submit: Option<SubmitHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_init", &self.on_init.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .field("on_all_valid", &self.on_all_valid.is_some())
            .field("on_has_invalid", &self.on_has_invalid.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

impl Hooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the init hook.
    pub fn on_init(mut self, hook: impl Fn(&FormValidator) + 'static) -> Self {
        self.on_init = Some(Rc::new(hook));
        self
    }

    /// Set the destroy hook.
    pub fn on_destroy(mut self, hook: impl Fn(&FormValidator) + 'static) -> Self {
        self.on_destroy = Some(Rc::new(hook));
        self
    }

    /// Set the all-valid hook.
    pub fn on_all_valid(mut self, hook: impl Fn(&FormValidator) + 'static) -> Self {
        self.on_all_valid = Some(Rc::new(hook));
        self
    }

    /// Set the has-invalid hook.
    pub fn on_has_invalid(mut self, hook: impl Fn(&FormValidator) + 'static) -> Self {
        self.on_has_invalid = Some(Rc::new(hook));
        self
    }

    /// Set the submit hook.
    pub fn on_submit(mut self, hook: impl Fn(&FormValidator, &SubmitEvent) + 'static) -> Self {
        self.on_submit = Some(Rc::new(hook));
        self
    }
}
