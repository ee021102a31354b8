//! Validation operations: run tests, apply outcomes, aggregate.

use crate::collaborator::{Attribute, FieldId, ValueLookup};
use crate::field::Field;
use crate::registry::TestContext;
use crate::validator::{FieldsLookup, FormValidator};

impl FormValidator {
    /// Validate one field. `None` when no field has this id.
    pub fn validate(&mut self, id: FieldId) -> Option<bool> {
        let index = self.index_of(id)?;
        Some(self.validate_at(index))
    }

    /// Reset one field to a neutral valid state without running its tests.
    pub fn devalidate(&mut self, id: FieldId) {
        if let Some(index) = self.index_of(id) {
            self.devalidate_at(index);
        }
    }

    /// Validate the field at `index`. `None` when out of range.
    pub fn validate_by_index(&mut self, index: usize) -> Option<bool> {
        (index < self.fields.len()).then(|| self.validate_at(index))
    }

    /// Devalidate the field at `index`.
    pub fn devalidate_by_index(&mut self, index: usize) {
        if index < self.fields.len() {
            self.devalidate_at(index);
        }
    }

    /// Validate every field in `group` (`None` selects ungrouped fields).
    pub fn validate_by_group(&mut self, group: Option<&str>) {
        for index in self.group_indices(group) {
            self.validate_at(index);
        }
    }

    /// Devalidate every field in `group` (`None` selects ungrouped fields).
    pub fn devalidate_by_group(&mut self, group: Option<&str>) {
        for index in self.group_indices(group) {
            self.devalidate_at(index);
        }
    }

    /// Validate the first field whose control has identifier `id`.
    pub fn validate_by_input_id(&mut self, id: &str) -> Option<bool> {
        let index = self.input_id_index(id)?;
        Some(self.validate_at(index))
    }

    /// Devalidate the first field whose control has identifier `id`.
    pub fn devalidate_by_input_id(&mut self, id: &str) {
        if let Some(index) = self.input_id_index(id) {
            self.devalidate_at(index);
        }
    }

    /// Validate every field in order and record the conjunction.
    ///
    /// Sets each control's invalid attribute and accessible label, focuses
    /// the first failing control when `set_focus` is on, then calls exactly
    /// one of the all-valid / has-invalid hooks.
    pub fn validate_all(&mut self) -> bool {
        let mut first_invalid = None;
        let mut all_valid = true;

        for index in 0..self.fields.len() {
            let valid = self.validate_at(index);
            let field = &mut self.fields[index];
            if valid {
                field.input.set_attribute(Attribute::Invalid, "false");
                field.input.remove_attribute(Attribute::Label);
            } else {
                all_valid = false;
                field.input.set_attribute(Attribute::Invalid, "true");
                if let Some(message) = field.messages.first() {
                    let label = match field.input.label() {
                        Some(label) => format!("{label} - {message}"),
                        None => message.clone(),
                    };
                    field.input.set_attribute(Attribute::Label, &label);
                }
                first_invalid.get_or_insert(index);
            }
        }

        self.is_all_valid = all_valid;
        tracing::debug!(
            fields = self.fields.len(),
            all_valid,
            first_invalid = ?first_invalid,
            "validated all fields"
        );

        if let Some(index) = first_invalid {
            if self.settings.set_focus {
                self.fields[index].input.focus();
            }
        }

        let hook = if all_valid {
            self.hooks.on_all_valid.clone()
        } else {
            self.hooks.on_has_invalid.clone()
        };
        if let Some(hook) = hook {
            hook(self);
        }

        all_valid
    }

    /// Devalidate every field.
    pub fn devalidate_all(&mut self) {
        for index in 0..self.fields.len() {
            self.devalidate_at(index);
        }
    }

    pub(crate) fn validate_at(&mut self, index: usize) -> bool {
        if self.fields[index].skips_validation() {
            let field = &mut self.fields[index];
            field.wrapper.remove_class(&self.settings.error_class);
            field.wrapper.remove_class(&self.settings.success_class);
            tracing::trace!(field = %field.id, "disabled control treated as valid");
            return true;
        }

        let (valid, messages) = self.run_tests(&self.fields[index]);

        let field = &mut self.fields[index];
        field.wrapper.remove_class(&self.settings.error_class);
        field.wrapper.remove_class(&self.settings.success_class);
        field.is_valid = valid;
        field.messages = messages;

        let hook = if valid {
            field.wrapper.add_class(&self.settings.success_class);
            field.on_valid.clone()
        } else {
            field.wrapper.add_class(&self.settings.error_class);
            field.on_invalid.clone()
        };
        tracing::trace!(
            field = %field.id,
            key = field.key(),
            valid,
            messages = field.messages.len(),
            "field validated"
        );

        if let Some(hook) = hook {
            let this: &Self = self;
            hook(this, &this.fields[index]);
        }
        valid
    }

    pub(crate) fn devalidate_at(&mut self, index: usize) {
        let field = &mut self.fields[index];
        field.wrapper.remove_class(&self.settings.error_class);
        field.wrapper.remove_class(&self.settings.success_class);
        field.is_valid = true;
        field.messages.clear();

        if let Some(hook) = field.on_valid.clone() {
            let this: &Self = self;
            hook(this, &this.fields[index]);
        }
    }

    /// Evaluate every configured test; unknown names are skipped.
    fn run_tests(&self, field: &Field) -> (bool, Vec<String>) {
        let own = FieldsLookup(&self.fields);
        let lookup: &dyn ValueLookup = match &self.lookup {
            Some(lookup) => lookup.as_ref(),
            None => &own,
        };
        let value = field.value();

        let mut valid = true;
        let mut messages = Vec::new();
        for test in &field.tests {
            let ctx = TestContext::new(&value, test.parameter.as_deref(), lookup);
            match self.registry.evaluate(&test.name, &ctx) {
                Some(true) => {}
                Some(false) => {
                    valid = false;
                    if let Some(message) = &test.message {
                        messages.push(message.clone());
                    }
                }
                None => {
                    tracing::debug!(field = %field.id, test = %test.name, "unknown test skipped");
                }
            }
        }
        (valid, messages)
    }

    fn group_indices(&self, group: Option<&str>) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.in_group(group))
            .map(|(index, _)| index)
            .collect()
    }

    fn input_id_index(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.input.id() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::collaborator::Attribute;
    use crate::field::{FieldConfig, TestSpec};
    use crate::hooks::Hooks;
    use crate::memory::{ChoiceGroup, MemoryControl, MemoryWrapper};
    use crate::options::ValidatorOptions;
    use crate::validator::FormValidator;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn field(control: &MemoryControl, wrapper: &MemoryWrapper, tests: Vec<TestSpec>) -> FieldConfig {
        FieldConfig::new()
            .input(control.clone())
            .wrapper(wrapper.clone())
            .tests(tests)
    }

    fn single(control: &MemoryControl, wrapper: &MemoryWrapper, tests: Vec<TestSpec>) -> FormValidator {
        FormValidator::new(ValidatorOptions::new().field(field(control, wrapper, tests))).unwrap()
    }

    fn required_email() -> Vec<TestSpec> {
        vec![
            TestSpec::new("required").with_message("E-mail is required"),
            TestSpec::new("email").with_message("Invalid e-mail"),
        ]
    }

    #[test]
    fn test_no_tests_is_always_valid() {
        let control = MemoryControl::text("free");
        let mut validator = single(&control, &MemoryWrapper::new(), vec![]);
        assert_eq!(validator.validate_by_index(0), Some(true));
        control.set_value("anything");
        assert_eq!(validator.validate_by_index(0), Some(true));
        assert!(validator.fields()[0].messages().is_empty());
    }

    #[test]
    fn test_required_email_scenario() {
        let control = MemoryControl::text("email");
        let wrapper = MemoryWrapper::new();
        let mut validator = single(&control, &wrapper, required_email());

        assert_eq!(validator.validate_by_index(0), Some(false));
        assert_eq!(validator.fields()[0].messages(), ["E-mail is required"]);
        assert!(wrapper.has_class("has-error"));
        assert!(!wrapper.has_class("has-success"));

        control.set_value("a@b.c");
        assert_eq!(validator.validate_by_index(0), Some(true));
        assert!(validator.fields()[0].messages().is_empty());
        assert!(wrapper.has_class("has-success"));
        assert!(!wrapper.has_class("has-error"));

        control.set_value("not-an-email");
        assert_eq!(validator.validate_by_index(0), Some(false));
        assert_eq!(validator.fields()[0].messages(), ["Invalid e-mail"]);
    }

    #[test]
    fn test_all_failing_tests_contribute_messages() {
        let control = MemoryControl::text("code");
        control.set_value("x");
        let mut validator = single(
            &control,
            &MemoryWrapper::new(),
            vec![
                TestSpec::new("min-length").with_parameter("3").with_message("Too short"),
                TestSpec::new("integer").with_message("Not a number"),
                TestSpec::new("bool"),
                TestSpec::new("max-length").with_parameter("5").with_message("Too long"),
            ],
        );
        assert_eq!(validator.validate_by_index(0), Some(false));
        assert_eq!(validator.fields()[0].messages(), ["Too short", "Not a number"]);
    }

    #[test]
    fn test_min_length_scenario() {
        let control = MemoryControl::text("nick");
        let mut validator = single(
            &control,
            &MemoryWrapper::new(),
            vec![TestSpec::new("min-length").with_parameter("3")],
        );
        control.set_value("ab");
        assert_eq!(validator.validate_by_index(0), Some(false));
        control.set_value("abc");
        assert_eq!(validator.validate_by_index(0), Some(true));
        control.set_value("");
        assert_eq!(validator.validate_by_index(0), Some(true));
    }

    #[test]
    fn test_in_array_scenario() {
        let control = MemoryControl::text("size");
        let mut validator = single(
            &control,
            &MemoryWrapper::new(),
            vec![TestSpec::new("in-array").with_parameter("a, b, c")],
        );
        control.set_value("b");
        assert_eq!(validator.validate_by_index(0), Some(true));
        control.set_value("d");
        assert_eq!(validator.validate_by_index(0), Some(false));
    }

    #[test]
    fn test_unknown_test_is_skipped() {
        let control = MemoryControl::text("zip");
        let mut validator = single(
            &control,
            &MemoryWrapper::new(),
            vec![TestSpec::new("postcode").with_message("Bad postcode")],
        );
        assert_eq!(validator.validate_by_index(0), Some(true));
        assert!(validator.fields()[0].messages().is_empty());
    }

    #[test]
    fn test_disabled_control_short_circuits() {
        let control = MemoryControl::text("vat");
        let wrapper = MemoryWrapper::new();
        let mut validator = single(
            &control,
            &wrapper,
            vec![TestSpec::new("required").with_message("Required")],
        );

        assert_eq!(validator.validate_by_index(0), Some(false));
        assert!(wrapper.has_class("has-error"));

        control.set_disabled(true);
        assert_eq!(validator.validate_by_index(0), Some(true));
        assert!(!wrapper.has_class("has-error"));
        assert!(!wrapper.has_class("has-success"));
        // Prior state is left as it was.
        assert!(!validator.fields()[0].is_valid());
        assert_eq!(validator.fields()[0].messages(), ["Required"]);
    }

    #[test]
    fn test_disabled_control_validated_when_enabled_by_config() {
        let control = MemoryControl::text("vat");
        control.set_disabled(true);
        let mut validator = FormValidator::new(
            ValidatorOptions::new().field(
                field(&control, &MemoryWrapper::new(), vec![TestSpec::new("required")])
                    .validate_when_disabled(true),
            ),
        )
        .unwrap();
        assert_eq!(validator.validate_by_index(0), Some(false));
    }

    #[test]
    fn test_choice_group_required() {
        let group = ChoiceGroup::new();
        let yes = MemoryControl::choice("agree", "yes", &group);
        let no = MemoryControl::choice("agree", "no", &group);
        let mut validator = single(&yes, &MemoryWrapper::new(), vec![TestSpec::new("required")]);

        assert_eq!(validator.validate_by_index(0), Some(false));
        no.set_checked(true);
        assert_eq!(validator.validate_by_index(0), Some(true));
    }

    #[test]
    fn test_cross_field_lookup_uses_own_fields() {
        let password = MemoryControl::text("password");
        let confirm = MemoryControl::text("confirm");
        let mut validator = FormValidator::new(
            ValidatorOptions::new()
                .field(field(&password, &MemoryWrapper::new(), vec![]))
                .field(field(
                    &confirm,
                    &MemoryWrapper::new(),
                    vec![TestSpec::new("matches").with_parameter("password")],
                )),
        )
        .unwrap();

        password.set_value("secret");
        confirm.set_value("secrets");
        assert_eq!(validator.validate_by_index(1), Some(false));
        confirm.set_value("secret");
        assert_eq!(validator.validate_by_index(1), Some(true));
    }

    #[test]
    fn test_devalidate_resets_without_running_tests() {
        let control = MemoryControl::text("email");
        let wrapper = MemoryWrapper::new();
        let valid_calls = Rc::new(Cell::new(0));
        let calls = Rc::clone(&valid_calls);
        let mut validator = FormValidator::new(
            ValidatorOptions::new().field(
                field(&control, &wrapper, required_email())
                    .on_valid(move |_, _| calls.set(calls.get() + 1)),
            ),
        )
        .unwrap();

        let id = validator.fields()[0].id();
        assert_eq!(validator.validate(id), Some(false));
        validator.devalidate(id);

        let field = &validator.fields()[0];
        assert!(field.is_valid());
        assert!(field.messages().is_empty());
        assert!(!wrapper.has_class("has-error"));
        assert!(!wrapper.has_class("has-success"));
        assert_eq!(valid_calls.get(), 1);
    }

    #[test]
    fn test_field_hooks_exactly_one_per_run() {
        let control = MemoryControl::text("name");
        let log = Rc::new(RefCell::new(Vec::new()));
        let (on_valid, on_invalid) = (Rc::clone(&log), Rc::clone(&log));
        let mut validator = FormValidator::new(
            ValidatorOptions::new().field(
                field(&control, &MemoryWrapper::new(), vec![TestSpec::new("required")])
                    .on_valid(move |_, f| on_valid.borrow_mut().push(format!("valid:{}", f.key())))
                    .on_invalid(move |_, f| {
                        on_invalid.borrow_mut().push(format!("invalid:{}", f.key()));
                    }),
            ),
        )
        .unwrap();

        validator.validate_by_index(0);
        control.set_value("Ada");
        validator.validate_by_index(0);
        assert_eq!(*log.borrow(), vec!["invalid:name", "valid:name"]);
    }

    #[test]
    fn test_validate_all_aggregates_and_marks() {
        let name = MemoryControl::text("name").with_label("Name");
        let email = MemoryControl::text("email");
        let city = MemoryControl::text("city");
        let mut validator = FormValidator::new(
            ValidatorOptions::new()
                .field(field(&name, &MemoryWrapper::new(), vec![TestSpec::new("required").with_message("Required")]))
                .field(field(&email, &MemoryWrapper::new(), required_email()))
                .field(field(&city, &MemoryWrapper::new(), vec![])),
        )
        .unwrap();

        email.set_value("bad");
        assert!(!validator.validate_all());
        assert!(!validator.is_all_valid());

        assert_eq!(name.attribute(Attribute::Invalid).as_deref(), Some("true"));
        assert_eq!(name.attribute(Attribute::Label).as_deref(), Some("Name - Required"));
        assert_eq!(email.attribute(Attribute::Label).as_deref(), Some("Invalid e-mail"));
        assert_eq!(city.attribute(Attribute::Invalid).as_deref(), Some("false"));
        // Focus moves to the first failing field only.
        assert_eq!(name.focus_count(), 1);
        assert_eq!(email.focus_count(), 0);

        name.set_value("Ada");
        email.set_value("ada@example.org");
        assert!(validator.validate_all());
        assert!(validator.is_all_valid());
        assert_eq!(name.attribute(Attribute::Invalid).as_deref(), Some("false"));
        assert_eq!(name.attribute(Attribute::Label), None);
    }

    #[test]
    fn test_validate_all_without_focus() {
        let name = MemoryControl::text("name");
        let mut validator = FormValidator::new(
            ValidatorOptions::new()
                .set_focus(false)
                .field(field(&name, &MemoryWrapper::new(), vec![TestSpec::new("required")])),
        )
        .unwrap();
        assert!(!validator.validate_all());
        assert_eq!(name.focus_count(), 0);
        // No message configured: no label either.
        assert_eq!(name.attribute(Attribute::Label), None);
    }

    #[test]
    fn test_validate_all_hooks() {
        let name = MemoryControl::text("name");
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let (valid, invalid) = (Rc::clone(&outcomes), Rc::clone(&outcomes));
        let mut validator = FormValidator::new(
            ValidatorOptions::new()
                .field(field(&name, &MemoryWrapper::new(), vec![TestSpec::new("required")]))
                .hooks(
                    Hooks::new()
                        .on_all_valid(move |v| valid.borrow_mut().push(("all-valid", v.is_all_valid())))
                        .on_has_invalid(move |v| {
                            invalid.borrow_mut().push(("has-invalid", v.is_all_valid()));
                        }),
                ),
        )
        .unwrap();

        validator.validate_all();
        name.set_value("x");
        validator.validate_all();
        assert_eq!(
            *outcomes.borrow(),
            vec![("has-invalid", false), ("all-valid", true)]
        );
    }

    #[test]
    fn test_is_all_valid_is_stale_after_single_field_ops() {
        let name = MemoryControl::text("name");
        let mut validator =
            single(&name, &MemoryWrapper::new(), vec![TestSpec::new("required")]);
        assert!(!validator.validate_all());
        name.set_value("x");
        assert_eq!(validator.validate_by_index(0), Some(true));
        assert!(!validator.is_all_valid());
    }

    #[test]
    fn test_scoped_operations() {
        let controls: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| MemoryControl::text(n).with_id(&format!("id-{n}")))
            .collect();
        let wrappers: Vec<_> = (0..3).map(|_| MemoryWrapper::new()).collect();
        let mut validator = FormValidator::new(
            ValidatorOptions::new()
                .field(field(&controls[0], &wrappers[0], vec![TestSpec::new("required")]).group("one"))
                .field(field(&controls[1], &wrappers[1], vec![TestSpec::new("required")]).group("two"))
                .field(field(&controls[2], &wrappers[2], vec![TestSpec::new("required")])),
        )
        .unwrap();

        validator.validate_by_group(Some("two"));
        assert!(!wrappers[0].has_class("has-error"));
        assert!(wrappers[1].has_class("has-error"));

        validator.validate_by_group(None);
        assert!(wrappers[2].has_class("has-error"));

        assert_eq!(validator.validate_by_input_id("id-a"), Some(false));
        assert!(wrappers[0].has_class("has-error"));

        validator.devalidate_by_group(Some("two"));
        assert!(!wrappers[1].has_class("has-error"));
        validator.devalidate_by_input_id("id-a");
        assert!(!wrappers[0].has_class("has-error"));
        validator.devalidate_by_index(2);
        assert!(!wrappers[2].has_class("has-error"));

        // Lookups that match nothing are no-ops.
        validator.validate_by_group(Some("missing"));
        assert_eq!(validator.validate_by_input_id("missing"), None);
        assert_eq!(validator.validate_by_index(9), None);
        validator.devalidate_by_index(9);
    }

    #[test]
    fn test_devalidate_all_covers_every_field() {
        let wrappers: Vec<_> = (0..3).map(|_| MemoryWrapper::new()).collect();
        let mut options = ValidatorOptions::new();
        for (i, wrapper) in wrappers.iter().enumerate() {
            options = options.field(field(
                &MemoryControl::text(&format!("f{i}")),
                wrapper,
                vec![TestSpec::new("required")],
            ));
        }
        let mut validator = FormValidator::new(options).unwrap();

        assert!(!validator.validate_all());
        validator.devalidate_all();
        assert!(validator.fields().iter().all(|f| f.is_valid()));
        assert!(wrappers.iter().all(|w| w.classes().is_empty()));
    }

    proptest! {
        #[test]
        fn prop_validate_is_idempotent(value in ".{0,12}", min in 0usize..6) {
            let control = MemoryControl::text("v");
            control.set_value(&value);
            let mut validator = single(
                &control,
                &MemoryWrapper::new(),
                vec![
                    TestSpec::new("required").with_message("required"),
                    TestSpec::new("min-length").with_parameter(&min.to_string()).with_message("short"),
                    TestSpec::new("integer").with_message("integer"),
                ],
            );
            let first = validator.validate_by_index(0);
            let first_messages = validator.fields()[0].messages().to_vec();
            let second = validator.validate_by_index(0);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first_messages, validator.fields()[0].messages().to_vec());
        }

        #[test]
        fn prop_validate_all_is_conjunction(values in proptest::collection::vec("[a-z]{0,3}", 1..6)) {
            let controls: Vec<_> = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let c = MemoryControl::text(&format!("f{i}"));
                    c.set_value(v);
                    c
                })
                .collect();
            let mut options = ValidatorOptions::new().set_focus(false);
            for control in &controls {
                options = options.field(field(control, &MemoryWrapper::new(), vec![
                    TestSpec::new("required"),
                    TestSpec::new("max-length").with_parameter("2"),
                ]));
            }
            let mut validator = FormValidator::new(options).unwrap();

            let individually: Vec<_> = (0..controls.len())
                .map(|i| validator.validate_by_index(i).unwrap_or(false))
                .collect();
            let all = validator.validate_all();
            prop_assert_eq!(all, individually.iter().all(|v| *v));
            prop_assert_eq!(validator.is_all_valid(), all);
        }
    }
}
