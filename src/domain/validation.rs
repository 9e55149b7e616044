//! Step validation.
//!
//! Only emptiness is checked. Range hints declared on the fields are shown to
//! the user but never block a step.

use std::collections::BTreeMap;

use super::form::{Field, FormValues};

/// Message attached to a field that was left empty.
pub const REQUIRED_MESSAGE: &str = "Required";

/// Per-field validation messages.
///
/// A field is present only while a rule currently fails for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    /// An empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Message for a field, if it is failing.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Record a failing field.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop a field's error. Returns whether one was present.
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    /// Additive merge: entries in `other` overwrite, unrelated entries stay.
    pub fn merge(&mut self, other: &FormErrors) {
        for (field, message) in &other.0 {
            self.0.insert(*field, message.clone());
        }
    }

    /// Failing fields, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Validate the given fields against the current values.
///
/// Returns an entry with [`REQUIRED_MESSAGE`] for every blank field; an
/// empty result means the fields pass.
#[must_use]
pub fn validate_fields(fields: &[Field], values: &FormValues) -> FormErrors {
    let mut errors = FormErrors::new();
    for field in fields {
        if values.get(*field).is_blank() {
            errors.insert(*field, REQUIRED_MESSAGE);
        }
    }
    errors
}
