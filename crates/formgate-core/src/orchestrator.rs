//! Event handlers. The host routes each notification it was asked to listen
//! for to the matching handler; handlers ignore events whose listener is not
//! currently wired.

use crate::collaborator::{ClickEvent, FieldId, SubmitEvent, SubmitterId};
use crate::validator::FormValidator;

impl FormValidator {
    /// A proxy submitter was clicked: suppress its default action and
    /// activate the real submit trigger.
    pub fn on_trigger_click(&mut self, submitter: SubmitterId, event: &mut ClickEvent) {
        if !self.is_initialized || submitter.0 >= self.submitters.len() {
            return;
        }
        let Some(trigger) = self.submit_trigger.as_mut() else {
            return;
        };
        event.prevent_default();
        tracing::trace!(submitter = submitter.0, "forwarding click to submit trigger");
        trigger.click();
    }

    /// The bound form is being submitted.
    ///
    /// Runs `validate_all`; an invalid form has its submission blocked, a
    /// valid one is marked submitted (once per instance) and reported to the
    /// submit hook.
    pub fn on_submit(&mut self, event: &mut SubmitEvent) {
        if !self.is_initialized || !self.settings.validation_on_submit || self.form.is_none() {
            return;
        }
        if self.is_submitted {
            tracing::trace!("form already submitted, ignoring");
            return;
        }

        if !self.validate_all() {
            event.prevent_default();
            tracing::debug!("submission blocked by invalid fields");
            return;
        }

        self.is_submitted = true;
        if let Some(form) = self.form.as_mut() {
            form.add_class(&self.settings.submit_class);
        }
        tracing::info!(fields = self.fields.len(), "form submitted");

        if let Some(hook) = self.hooks.on_submit.clone() {
            hook(self, event);
        }
    }

    /// A field's control lost focus: validate it and, when it passes,
    /// re-validate the fields that depend on it (one hop).
    pub fn on_blur(&mut self, id: FieldId) {
        if !self.is_initialized || !self.settings.live_validation {
            return;
        }
        let Some(index) = self.index_of(id) else {
            return;
        };
        if !self.validate_at(index) {
            return;
        }

        let key = self.fields[index].key().to_string();
        let dependents: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(other, f)| *other != index && f.dependent_field_key() == Some(key.as_str()))
            .map(|(other, _)| other)
            .collect();
        if !dependents.is_empty() {
            tracing::trace!(field = %id, dependents = dependents.len(), "cascading validation");
        }
        for other in dependents {
            self.validate_at(other);
        }
    }

    /// A field's control gained focus: clear its markers. Validity is left
    /// untouched.
    pub fn on_focus(&mut self, id: FieldId) {
        if !self.is_initialized || !self.settings.live_validation {
            return;
        }
        let Some(index) = self.index_of(id) else {
            return;
        };
        let field = &mut self.fields[index];
        field.wrapper.remove_class(&self.settings.error_class);
        field.wrapper.remove_class(&self.settings.success_class);
    }
}
