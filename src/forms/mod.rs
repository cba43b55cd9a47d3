//! Dynamic form engine.
//!
//! A form is a list of [`FieldDescriptor`]s bound to default values. The
//! engine decides which fields are visible from the live values, renders
//! them, validates them and assembles the submission object.

pub mod catalog;
mod engine;
mod field;
mod values;

pub use engine::{Control, Form, RenderedField, SubmitButton};
pub use field::{
    Condition, CustomCheck, FieldDescriptor, FieldKind, Predicate, Rule, SelectOption,
    RELATIONAL_FIELDS,
};
pub use values::FormValues;

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Inline messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Duplicate field `{0}`")]
    DuplicateField(String),
    #[error("Field `{field}` depends on `{dependency}`, which is not part of the form")]
    UnknownDependency { field: String, dependency: String },
    #[error("Field `{0}` clashes with a nested field of the same name")]
    ConflictingPath(String),
    #[error("Unknown field `{0}`")]
    UnknownField(String),
    #[error("Field `{0}` is locked")]
    FieldLocked(String),
    #[error("`{value}` is not an option of `{field}`")]
    InvalidOption { field: String, value: String },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("A submission is already in progress")]
    Busy,
}

/// Outcome of [`Form::submit_with`]: the form refused to submit, or the
/// handler failed.
#[derive(Debug, Error)]
pub enum SubmitError<E> {
    #[error(transparent)]
    Form(FormError),
    #[error("{0}")]
    Handler(E),
}
