//! Collaborator traits the engine drives.
//!
//! The engine never touches markup directly. A host (browser binding,
//! terminal UI, headless test harness) implements these traits and routes
//! control events back through the handlers in [`crate::FormValidator`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned identity of a field, used to route control events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u64);

impl FieldId {
    /// Create a new field ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field-{}", self.0)
    }
}

/// Position of a proxy submit control in the submitter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitterId(pub usize);

/// Current value of a control as seen by the tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValue {
    /// Text value of the control.
    pub text: String,
    /// For choice groups (radio, checkbox): how many peers sharing the
    /// control's name are selected. `None` for plain inputs.
    pub checked_peers: Option<usize>,
}

impl FieldValue {
    /// Value of a plain text-like input.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked_peers: None,
        }
    }

    /// Value of a choice-group member.
    pub fn choice(text: impl Into<String>, checked_peers: usize) -> Self {
        Self {
            text: text.into(),
            checked_peers: Some(checked_peers),
        }
    }

    /// Whether the value counts as filled in.
    ///
    /// Choice groups are filled when any peer is selected, other inputs when
    /// the text is non-empty.
    pub fn is_filled(&self) -> bool {
        match self.checked_peers {
            Some(count) => count > 0,
            None => !self.text.is_empty(),
        }
    }
}

/// Attributes the engine sets on controls and forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Control participates in a `required` test.
    Required,
    /// Control failed its last whole-form validation.
    Invalid,
    /// Accessible label carrying the first failure message.
    Label,
    /// Form should skip its native validation.
    NoValidate,
}

impl Attribute {
    /// Markup name of the attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "aria-required",
            Self::Invalid => "aria-invalid",
            Self::Label => "aria-label",
            Self::NoValidate => "novalidate",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Focus notifications a field subscribes to while live validation is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusListener {
    /// Control lost focus.
    Blur,
    /// Control gained focus.
    Focus,
}

/// An input-like control bound to a field.
pub trait Control {
    /// Current value.
    fn value(&self) -> FieldValue;

    /// Control name; dependency links and name lookups refer to it.
    fn name(&self) -> &str;

    /// Control identifier, if any.
    fn id(&self) -> Option<&str>;

    /// Human-readable label associated with the control.
    fn label(&self) -> Option<&str> {
        None
    }

    /// Whether the control is disabled.
    fn is_disabled(&self) -> bool;

    /// Set an attribute.
    fn set_attribute(&mut self, attribute: Attribute, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&mut self, attribute: Attribute);

    /// Start delivering `kind` notifications for `field`.
    fn listen(&mut self, kind: FocusListener, field: FieldId);

    /// Stop delivering `kind` notifications for `field`.
    fn unlisten(&mut self, kind: FocusListener, field: FieldId);

    /// Move input focus to the control.
    fn focus(&mut self);
}

/// Visual container of a field carrying the success/error markers.
pub trait Wrapper {
    /// Add a class marker.
    fn add_class(&mut self, class: &str);

    /// Remove a class marker.
    fn remove_class(&mut self, class: &str);
}

/// The form the validator intercepts submission on.
pub trait FormContainer {
    /// Set an attribute.
    fn set_attribute(&mut self, attribute: Attribute, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&mut self, attribute: Attribute);

    /// Start delivering submit notifications.
    fn listen_submit(&mut self);

    /// Stop delivering submit notifications.
    fn unlisten_submit(&mut self);

    /// Add a class marker.
    fn add_class(&mut self, class: &str);

    /// Remove a class marker.
    fn remove_class(&mut self, class: &str);
}

/// A proxy control whose activation submits the form.
pub trait Submitter {
    /// Start delivering click notifications tagged with `id`.
    fn listen_click(&mut self, id: SubmitterId);

    /// Stop delivering click notifications.
    fn unlisten_click(&mut self, id: SubmitterId);
}

/// The real submit control a proxy forwards to.
pub trait SubmitTrigger {
    /// Activate the trigger.
    fn click(&mut self);
}

/// Resolves other controls' values for cross-field tests.
pub trait ValueLookup {
    /// Value of the control with the given name.
    fn by_name(&self, name: &str) -> Option<FieldValue>;

    /// Value of the control with the given identifier.
    fn by_id(&self, id: &str) -> Option<FieldValue>;
}

/// A lookup that resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl ValueLookup for NoLookup {
    fn by_name(&self, _name: &str) -> Option<FieldValue> {
        None
    }

    fn by_id(&self, _id: &str) -> Option<FieldValue> {
        None
    }
}

/// A submit notification on the bound form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    /// Create a new submit event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the native submission.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether native submission was blocked.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A click notification on a proxy submitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    default_prevented: bool,
}

impl ClickEvent {
    /// Create a new click event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the control's own default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the default action was blocked.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
