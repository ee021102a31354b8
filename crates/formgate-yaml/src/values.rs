//! Submitted values for a manifest-built form.
//!
//! [`parse_values`] keeps every scalar exactly as written in the source, so
//! `36.0` reaches the tests as `"36.0"` and `1.50` as `"1.50"`. Going through
//! serde directly (`FieldInput: Deserialize`) works for any format but sees
//! numbers only after they were parsed; decimal numbers are rejected there
//! rather than re-rendered.

use crate::error::ParseError;
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A submitted value: text for text fields, a list of selected options for
/// choice fields. A blank or null value is empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldInput {
    /// Text value, as written
    Text(String),
    /// Selected options
    Selected(Vec<String>),
}

impl FieldInput {
    /// Text of a scalar; `None` for a selection list.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Selected(_) => None,
        }
    }
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Submitted values keyed by field name.
pub type FormValues = BTreeMap<String, FieldInput>;

/// Parse a YAML (or JSON) mapping of field names to values, keeping each
/// scalar's source text.
///
/// # Errors
///
/// Returns [`ParseError::Yaml`] when the document is not a mapping of
/// scalars and lists.
pub fn parse_values(yaml: &str) -> Result<FormValues, ParseError> {
    // First pass only learns which entries are lists.
    let shape: Option<BTreeMap<String, serde_yaml_ng::Value>> = serde_yaml_ng::from_str(yaml)?;
    let Some(shape) = shape else {
        return Ok(FormValues::new());
    };
    let lists: BTreeSet<String> = shape
        .into_iter()
        .filter(|(_, value)| value.is_sequence())
        .map(|(name, _)| name)
        .collect();

    let seed = ValuesSeed { lists: &lists };
    let values = seed.deserialize(serde_yaml_ng::Deserializer::from_str(yaml))?;
    tracing::trace!(
        values = values.len(),
        lists = lists.len(),
        "parsed submitted values"
    );
    Ok(values)
}

struct ValuesSeed<'a> {
    lists: &'a BTreeSet<String>,
}

impl<'de> DeserializeSeed<'de> for ValuesSeed<'_> {
    type Value = FormValues;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<FormValues, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ValuesSeed<'_> {
    type Value = FormValues;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of field names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FormValues, A::Error> {
        let mut values = FormValues::new();
        while let Some(name) = map.next_key::<String>()? {
            let input = if self.lists.contains(&name) {
                FieldInput::Selected(map.next_value()?)
            } else {
                let text: Option<SourceText> = map.next_value()?;
                FieldInput::Text(text.map(|t| t.0).unwrap_or_default())
            };
            values.insert(name, input);
        }
        Ok(values)
    }
}

/// A scalar read through `deserialize_str`, which serde_yaml_ng answers with
/// the plain scalar as written.
struct SourceText(String);

impl<'de> Deserialize<'de> for SourceText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourceTextVisitor;

        impl Visitor<'_> for SourceTextVisitor {
            type Value = SourceText;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SourceText, E> {
                Ok(SourceText(v.to_string()))
            }
        }

        deserializer.deserialize_str(SourceTextVisitor)
    }
}

impl<'de> Deserialize<'de> for FieldInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldInputVisitor)
    }
}

struct FieldInputVisitor;

impl<'de> Visitor<'de> for FieldInputVisitor {
    type Value = FieldInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, integer, boolean, null or list of strings (quote decimal numbers)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldInput, E> {
        Ok(FieldInput::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FieldInput, E> {
        Ok(FieldInput::Text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldInput, E> {
        Ok(FieldInput::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldInput, E> {
        Ok(FieldInput::Text(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldInput, E> {
        Ok(FieldInput::Text(v.to_string()))
    }

    // The source digits are gone by now; `1.50` would come back as `1.5`.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldInput, E> {
        Err(E::invalid_type(Unexpected::Float(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<FieldInput, E> {
        Ok(FieldInput::Text(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<FieldInput, E> {
        self.visit_unit()
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<FieldInput, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldInput, A::Error> {
        let mut selected = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(option) = seq.next_element::<String>()? {
            selected.push(option);
        }
        Ok(FieldInput::Selected(selected))
    }
}
