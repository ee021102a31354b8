//! In-memory collaborators for headless hosts and tests.
//!
//! Every type here is a cheap handle: clones share state, so a caller can keep
//! one handle while the validator owns another and observe what the engine
//! did (attributes, classes, listeners, focus).

use crate::collaborator::{
    Attribute, Control, FieldId, FieldValue, FocusListener, FormContainer, SubmitTrigger,
    Submitter, SubmitterId, ValueLookup, Wrapper,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

/// Selection state shared by the members of a radio/checkbox group.
#[derive(Debug, Clone, Default)]
pub struct ChoiceGroup {
    members: Rc<RefCell<Vec<Rc<Cell<bool>>>>>,
}

impl ChoiceGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    fn join(&self) -> Rc<Cell<bool>> {
        let checked = Rc::new(Cell::new(false));
        self.members.borrow_mut().push(Rc::clone(&checked));
        checked
    }

    /// Number of selected members.
    pub fn checked_count(&self) -> usize {
        self.members.borrow().iter().filter(|m| m.get()).count()
    }
}

#[derive(Debug, Default)]
struct ControlState {
    value: String,
    disabled: bool,
    attributes: HashMap<Attribute, String>,
    listeners: HashSet<(FocusListener, FieldId)>,
    focus_count: usize,
}

#[derive(Debug)]
struct Choice {
    group: ChoiceGroup,
    checked: Rc<Cell<bool>>,
}

/// A text input or choice-group member.
#[derive(Debug, Clone)]
pub struct MemoryControl {
    name: Rc<str>,
    id: Option<Rc<str>>,
    label: Option<Rc<str>>,
    choice: Option<Rc<Choice>>,
    state: Rc<RefCell<ControlState>>,
}

impl MemoryControl {
    /// A text-like input named `name` with an empty value.
    pub fn text(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            id: None,
            label: None,
            choice: None,
            state: Rc::default(),
        }
    }

    /// A member of `group` named `name` whose own value is `value`.
    pub fn choice(name: &str, value: &str, group: &ChoiceGroup) -> Self {
        let mut control = Self::text(name);
        control.state.borrow_mut().value = value.to_string();
        control.choice = Some(Rc::new(Choice {
            group: group.clone(),
            checked: group.join(),
        }));
        control
    }

    /// Set the control identifier.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(Rc::from(id));
        self
    }

    /// Set the human-readable label.
    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(Rc::from(label));
        self
    }

    /// Replace the current value.
    pub fn set_value(&self, value: &str) {
        self.state.borrow_mut().value = value.to_string();
    }

    /// Select or clear a choice member. Ignored for text inputs.
    pub fn set_checked(&self, checked: bool) {
        if let Some(choice) = &self.choice {
            choice.checked.set(checked);
        }
    }

    /// Enable or disable the control.
    pub fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }

    /// Current value of an attribute.
    pub fn attribute(&self, attribute: Attribute) -> Option<String> {
        self.state.borrow().attributes.get(&attribute).cloned()
    }

    /// Whether any field listens for `kind` on this control.
    pub fn is_listening(&self, kind: FocusListener) -> bool {
        self.state.borrow().listeners.iter().any(|(k, _)| *k == kind)
    }

    /// How many times the engine moved focus here.
    pub fn focus_count(&self) -> usize {
        self.state.borrow().focus_count
    }
}

impl Control for MemoryControl {
    fn value(&self) -> FieldValue {
        let text = self.state.borrow().value.clone();
        match &self.choice {
            Some(choice) => FieldValue::choice(text, choice.group.checked_count()),
            None => FieldValue::text(text),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    fn set_attribute(&mut self, attribute: Attribute, value: &str) {
        self.state
            .borrow_mut()
            .attributes
            .insert(attribute, value.to_string());
    }

    fn remove_attribute(&mut self, attribute: Attribute) {
        self.state.borrow_mut().attributes.remove(&attribute);
    }

    fn listen(&mut self, kind: FocusListener, field: FieldId) {
        self.state.borrow_mut().listeners.insert((kind, field));
    }

    fn unlisten(&mut self, kind: FocusListener, field: FieldId) {
        self.state.borrow_mut().listeners.remove(&(kind, field));
    }

    fn focus(&mut self) {
        self.state.borrow_mut().focus_count += 1;
    }
}

/// A field container recording its class markers.
#[derive(Debug, Clone, Default)]
pub struct MemoryWrapper {
    classes: Rc<RefCell<BTreeSet<String>>>,
}

impl MemoryWrapper {
    /// Create a wrapper with no classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `class` is present.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    /// Present classes, sorted.
    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().iter().cloned().collect()
    }
}

impl Wrapper for MemoryWrapper {
    fn add_class(&mut self, class: &str) {
        self.classes.borrow_mut().insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.borrow_mut().remove(class);
    }
}

#[derive(Debug, Default)]
struct FormState {
    attributes: HashMap<Attribute, String>,
    classes: BTreeSet<String>,
    listening: bool,
}

/// A form recording attributes, classes and its submit subscription.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    state: Rc<RefCell<FormState>>,
}

impl MemoryForm {
    /// Create a bare form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `class` is present.
    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.contains(class)
    }

    /// Current value of an attribute.
    pub fn attribute(&self, attribute: Attribute) -> Option<String> {
        self.state.borrow().attributes.get(&attribute).cloned()
    }

    /// Whether submit notifications are wired.
    pub fn is_listening(&self) -> bool {
        self.state.borrow().listening
    }
}

impl FormContainer for MemoryForm {
    fn set_attribute(&mut self, attribute: Attribute, value: &str) {
        self.state
            .borrow_mut()
            .attributes
            .insert(attribute, value.to_string());
    }

    fn remove_attribute(&mut self, attribute: Attribute) {
        self.state.borrow_mut().attributes.remove(&attribute);
    }

    fn listen_submit(&mut self) {
        self.state.borrow_mut().listening = true;
    }

    fn unlisten_submit(&mut self) {
        self.state.borrow_mut().listening = false;
    }

    fn add_class(&mut self, class: &str) {
        self.state.borrow_mut().classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.state.borrow_mut().classes.remove(class);
    }
}

/// A proxy submit control recording its click subscription.
#[derive(Debug, Clone, Default)]
pub struct MemorySubmitter {
    listening: Rc<Cell<Option<SubmitterId>>>,
}

impl MemorySubmitter {
    /// Create an unwired submitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether click notifications are wired.
    pub fn is_listening(&self) -> bool {
        self.listening.get().is_some()
    }
}

impl Submitter for MemorySubmitter {
    fn listen_click(&mut self, id: SubmitterId) {
        self.listening.set(Some(id));
    }

    fn unlisten_click(&mut self, id: SubmitterId) {
        if self.listening.get() == Some(id) {
            self.listening.set(None);
        }
    }
}

/// A submit trigger counting its activations.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrigger {
    clicks: Rc<Cell<usize>>,
}

impl MemoryTrigger {
    /// Create a trigger with no clicks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of activations.
    pub fn clicks(&self) -> usize {
        self.clicks.get()
    }
}

impl SubmitTrigger for MemoryTrigger {
    fn click(&mut self) {
        self.clicks.set(self.clicks.get() + 1);
    }
}

/// Lookup over a set of controls, including ones no field is bound to.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    controls: Vec<MemoryControl>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control.
    pub fn insert(&mut self, control: MemoryControl) {
        self.controls.push(control);
    }

    /// Builder form of [`MemoryDocument::insert`].
    #[must_use]
    pub fn with(mut self, control: MemoryControl) -> Self {
        self.insert(control);
        self
    }

    /// Controls in insertion order.
    pub fn controls(&self) -> &[MemoryControl] {
        &self.controls
    }
}

impl ValueLookup for MemoryDocument {
    fn by_name(&self, name: &str) -> Option<FieldValue> {
        self.controls
            .iter()
            .find(|c| c.name() == name)
            .map(Control::value)
    }

    fn by_id(&self, id: &str) -> Option<FieldValue> {
        self.controls
            .iter()
            .find(|c| c.id() == Some(id))
            .map(Control::value)
    }
}
