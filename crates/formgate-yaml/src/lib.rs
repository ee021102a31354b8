//! YAML form manifests for formgate.
//!
//! A manifest describes a form's fields and settings; [`FormManifest::build`]
//! turns it plus a set of submitted values into a headless
//! [`formgate_core::FormValidator`]. Values files are read with
//! [`parse_values`], which keeps each value exactly as written.

mod error;
mod manifest;
mod values;

pub use error::ParseError;
pub use manifest::{FieldDef, FieldKind, FormManifest};
pub use values::{parse_values, FieldInput, FormValues};
