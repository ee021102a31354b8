//! YAML manifest types for formgate forms.

use crate::error::ParseError;
use crate::values::{FieldInput, FormValues};
use formgate_core::memory::{ChoiceGroup, MemoryControl, MemoryWrapper};
use formgate_core::{
    FieldConfig, FormValidator, TestRegistry, TestSpec, ValidatorOptions, ValidatorSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Form manifest loaded from a `form.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormManifest {
    /// Validator settings
    #[serde(default)]
    pub settings: ValidatorSettings,
    /// Fields in validation order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Kind of control a field is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Text-like input
    #[default]
    Text,
    /// Radio/checkbox group; `options` lists the member values
    Choice,
}

/// One field of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Control name
    pub name: String,
    /// Control identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Control kind
    #[serde(default)]
    pub kind: FieldKind,
    /// Member values of a choice group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Group label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Name of the field this one is re-validated after
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Validate even while disabled
    #[serde(default, skip_serializing_if = "is_false")]
    pub validate_when_disabled: bool,
    /// Control starts disabled
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Tests in evaluation order
    #[serde(default)]
    pub tests: Vec<TestSpec>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl FormManifest {
    /// Parse a manifest from YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(yaml)
    }

    /// Serialize manifest to YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }

    /// Parse and structurally check a manifest.
    pub fn load(yaml: &str) -> Result<Self, ParseError> {
        let manifest = Self::from_yaml(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Structural checks against the built-in tests.
    pub fn validate(&self) -> Result<(), ParseError> {
        self.validate_with(&TestRegistry::builtin())
    }

    /// Structural checks: names present and unique, test names present,
    /// dependency targets declared, choice fields carrying options. With
    /// `strict_tests`, every test name must be known to `registry`.
    pub fn validate_with(&self, registry: &TestRegistry) -> Result<(), ParseError> {
        let mut names = HashSet::new();
        for (index, def) in self.fields.iter().enumerate() {
            if def.name.is_empty() {
                return Err(ParseError::MissingField(format!("fields[{index}].name")));
            }
            if !names.insert(def.name.as_str()) {
                return Err(ParseError::Validation(format!(
                    "duplicate field name '{}'",
                    def.name
                )));
            }
            for (position, test) in def.tests.iter().enumerate() {
                if test.name.trim().is_empty() {
                    return Err(ParseError::MissingField(format!(
                        "fields[{index}].tests[{position}].name"
                    )));
                }
                if self.settings.strict_tests && !registry.contains(&test.name) {
                    return Err(ParseError::Validation(format!(
                        "field '{}' uses unknown test '{}'",
                        def.name, test.name
                    )));
                }
            }
            match def.kind {
                FieldKind::Choice if def.options.is_empty() => {
                    return Err(ParseError::InvalidValue {
                        field: def.name.clone(),
                        message: "choice field needs at least one option".to_string(),
                    });
                }
                FieldKind::Text if !def.options.is_empty() => {
                    return Err(ParseError::InvalidValue {
                        field: def.name.clone(),
                        message: "options only apply to choice fields".to_string(),
                    });
                }
                _ => {}
            }
        }

        for def in &self.fields {
            if let Some(target) = &def.depends_on {
                if !names.contains(target.as_str()) {
                    return Err(ParseError::Validation(format!(
                        "field '{}' depends on undeclared field '{target}'",
                        def.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build a headless validator over in-memory controls holding `values`.
    pub fn build(&self, values: &FormValues) -> Result<FormValidator, ParseError> {
        self.build_with_registry(values, Arc::new(TestRegistry::builtin()))
    }

    /// Same as [`FormManifest::build`] with a caller-supplied registry.
    pub fn build_with_registry(
        &self,
        values: &FormValues,
        registry: Arc<TestRegistry>,
    ) -> Result<FormValidator, ParseError> {
        self.validate_with(&registry)?;
        if let Some(unknown) = values.keys().find(|name| self.field(name).is_none()) {
            return Err(ParseError::InvalidValue {
                field: unknown.clone(),
                message: "no such field in the manifest".to_string(),
            });
        }

        let mut options = ValidatorOptions::new()
            .settings(self.settings.clone())
            .registry(registry);
        for def in &self.fields {
            let control = def.control(values.get(&def.name))?;
            options = options.field(def.config(control));
        }

        let validator = FormValidator::new(options)?;
        tracing::debug!(
            fields = validator.field_count(),
            values = values.len(),
            "built validator from manifest"
        );
        Ok(validator)
    }
}

impl FieldDef {
    fn control(&self, input: Option<&FieldInput>) -> Result<MemoryControl, ParseError> {
        let control = match self.kind {
            FieldKind::Text => {
                let text = match input {
                    None => String::new(),
                    Some(input) => input
                        .as_text()
                        .ok_or_else(|| ParseError::InvalidValue {
                            field: self.name.clone(),
                            message: "expected a single value".to_string(),
                        })?
                        .to_string(),
                };
                let control = MemoryControl::text(&self.name);
                control.set_value(&text);
                control
            }
            FieldKind::Choice => self.choice_control(input)?,
        };

        let control = match &self.id {
            Some(id) => control.with_id(id),
            None => control,
        };
        let control = match &self.label {
            Some(label) => control.with_label(label),
            None => control,
        };
        control.set_disabled(self.disabled);
        Ok(control)
    }

    /// The bound control is the first selected member, or the first member
    /// when nothing is selected. Blank text selects nothing.
    fn choice_control(&self, input: Option<&FieldInput>) -> Result<MemoryControl, ParseError> {
        let selected: Vec<String> = match input {
            None => Vec::new(),
            Some(FieldInput::Selected(list)) => list.clone(),
            Some(scalar) => scalar
                .as_text()
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .into_iter()
                .collect(),
        };
        if let Some(unknown) = selected.iter().find(|s| !self.options.contains(s)) {
            return Err(ParseError::InvalidValue {
                field: self.name.clone(),
                message: format!("unknown option '{unknown}'"),
            });
        }

        let group = ChoiceGroup::new();
        let members: Vec<MemoryControl> = self
            .options
            .iter()
            .map(|option| MemoryControl::choice(&self.name, option, &group))
            .collect();
        let mut bound = None;
        for (option, member) in self.options.iter().zip(&members) {
            if selected.contains(option) {
                member.set_checked(true);
                bound.get_or_insert_with(|| member.clone());
            }
        }
        bound
            .or_else(|| members.first().cloned())
            .ok_or_else(|| ParseError::InvalidValue {
                field: self.name.clone(),
                message: "choice field needs at least one option".to_string(),
            })
    }

    fn config(&self, control: MemoryControl) -> FieldConfig {
        let mut config = FieldConfig::new()
            .input(control)
            .wrapper(MemoryWrapper::new())
            .tests(self.tests.clone())
            .validate_when_disabled(self.validate_when_disabled);
        if let Some(group) = &self.group {
            config = config.group(group);
        }
        if let Some(target) = &self.depends_on {
            config = config.depends_on(target);
        }
        config
    }
}
