//! Wiring and unwiring of collaborators, and dynamic field membership.
//!
//! Every listener or attribute `init` puts in place is taken down again by
//! `destroy`, and the same holds per field for `add_field` and the removal
//! operations.

use crate::collaborator::{Attribute, FieldId, FocusListener, SubmitterId};
use crate::error::ConfigError;
use crate::field::{Field, FieldConfig};
use crate::options::ValidatorSettings;
use crate::validator::FormValidator;

impl FormValidator {
    /// Wire the validator to its collaborators. No-op when already
    /// initialized.
    pub fn init(&mut self) {
        if self.is_initialized {
            return;
        }

        if self.settings.validation_on_submit {
            if let Some(form) = self.form.as_mut() {
                form.set_attribute(Attribute::NoValidate, "true");
                form.listen_submit();
            }
        }
        for field in &mut self.fields {
            wire_field(field, &self.settings);
        }
        if self.submit_trigger.is_some() {
            for (index, submitter) in self.submitters.iter_mut().enumerate() {
                submitter.listen_click(SubmitterId(index));
            }
        }

        self.is_initialized = true;
        tracing::info!(fields = self.fields.len(), "validator initialized");

        if let Some(hook) = self.hooks.on_init.clone() {
            hook(self);
        }
    }

    /// Undo everything `init` did and reset the instance flags. No-op when
    /// not initialized.
    pub fn destroy(&mut self) {
        if !self.is_initialized {
            return;
        }

        if let Some(form) = self.form.as_mut() {
            if self.settings.validation_on_submit {
                form.remove_attribute(Attribute::NoValidate);
                form.unlisten_submit();
            }
            form.remove_class(&self.settings.submit_class);
        }
        for field in &mut self.fields {
            unwire_field(field, &self.settings);
        }
        if self.submit_trigger.is_some() {
            for (index, submitter) in self.submitters.iter_mut().enumerate() {
                submitter.unlisten_click(SubmitterId(index));
            }
        }

        self.is_all_valid = true;
        self.is_initialized = false;
        self.is_submitted = false;
        tracing::info!("validator destroyed");

        if let Some(hook) = self.hooks.on_destroy.clone() {
            hook(self);
        }
    }

    /// Append a field, wiring it when the validator is initialized.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the config is incomplete; the validator
    /// is left unchanged.
    pub fn add_field(&mut self, config: FieldConfig) -> Result<FieldId, ConfigError> {
        let index = self.fields.len();
        let id = self.next_field_id();
        let mut field = config.build(index, id, &self.registry, self.settings.strict_tests)?;
        self.commit_id();
        if self.is_initialized {
            wire_field(&mut field, &self.settings);
        }
        tracing::debug!(field = %id, key = field.key(), "field added");
        self.fields.push(field);
        Ok(id)
    }

    /// Remove up to `count` fields starting at `start`, unwiring them.
    /// Returns how many were removed; out-of-range bounds are clamped.
    pub fn remove_fields(&mut self, start: usize, count: usize) -> usize {
        let start = start.min(self.fields.len());
        let end = start.saturating_add(count).min(self.fields.len());
        let removed: Vec<Field> = self.fields.drain(start..end).collect();
        self.release(removed)
    }

    /// Remove the field at `index`.
    pub fn remove_field(&mut self, index: usize) -> usize {
        self.remove_fields(index, 1)
    }

    /// Remove every field in `group` (`None` selects ungrouped fields),
    /// keeping the others in their relative order.
    pub fn remove_fields_by_group(&mut self, group: Option<&str>) -> usize {
        let (removed, kept): (Vec<Field>, Vec<Field>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|f| f.in_group(group));
        self.fields = kept;
        self.release(removed)
    }

    fn release(&self, removed: Vec<Field>) -> usize {
        let count = removed.len();
        for mut field in removed {
            if self.is_initialized {
                unwire_field(&mut field, &self.settings);
            }
            tracing::debug!(field = %field.id, key = field.key(), "field removed");
        }
        count
    }
}

fn wire_field(field: &mut Field, settings: &ValidatorSettings) {
    if field.has_test("required") {
        field.input.set_attribute(Attribute::Required, "true");
    }
    field.is_valid = true;
    field.messages.clear();
    if settings.live_validation {
        field.input.listen(FocusListener::Blur, field.id);
        field.input.listen(FocusListener::Focus, field.id);
    }
}

fn unwire_field(field: &mut Field, settings: &ValidatorSettings) {
    field.input.remove_attribute(Attribute::Required);
    field.input.remove_attribute(Attribute::Invalid);
    field.input.remove_attribute(Attribute::Label);
    field.wrapper.remove_class(&settings.error_class);
    field.wrapper.remove_class(&settings.success_class);
    if settings.live_validation {
        field.input.unlisten(FocusListener::Blur, field.id);
        field.input.unlisten(FocusListener::Focus, field.id);
    }
}
