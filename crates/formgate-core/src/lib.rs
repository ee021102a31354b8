//! Core validation engine for formgate.
//!
//! This crate provides:
//! - Named tests: [`TestRegistry`] with the built-in catalogue in [`registry::builtin`]
//! - Field model: [`FieldConfig`], [`Field`], [`TestSpec`]
//! - The engine: [`FormValidator`] with validate / devalidate operations,
//!   event handlers and init / destroy lifecycle
//! - Collaborator traits the engine drives, plus in-memory implementations
//!   in [`memory`]
//!
//! # Example
//!
//! ```
//! use formgate_core::memory::{MemoryControl, MemoryWrapper};
//! use formgate_core::{FieldConfig, FormValidator, TestSpec, ValidatorOptions};
//!
//! let email = MemoryControl::text("email");
//! let mut validator = FormValidator::new(
//!     ValidatorOptions::new().field(
//!         FieldConfig::new()
//!             .input(email.clone())
//!             .wrapper(MemoryWrapper::new())
//!             .test(TestSpec::new("email").with_message("Invalid e-mail")),
//!     ),
//! )
//! .unwrap();
//!
//! email.set_value("not-an-address");
//! assert!(!validator.validate_all());
//!
//! email.set_value("ada@example.org");
//! assert!(validator.validate_all());
//! ```

mod collaborator;
mod engine;
mod error;
mod field;
mod hooks;
mod lifecycle;
pub mod memory;
mod options;
mod orchestrator;
pub mod registry;
mod report;
mod validator;

pub use collaborator::{
    Attribute, ClickEvent, Control, FieldId, FieldValue, FocusListener, FormContainer, NoLookup,
    SubmitEvent, SubmitTrigger, Submitter, SubmitterId, ValueLookup, Wrapper,
};
pub use error::ConfigError;
pub use field::{Field, FieldConfig, TestSpec};
pub use hooks::{FieldHook, Hooks, SubmitHook, ValidatorHook};
pub use options::{ValidatorOptions, ValidatorSettings};
pub use registry::{FnTest, Test, TestContext, TestRegistry};
pub use report::{FieldReport, ValidationReport};
pub use validator::FormValidator;
