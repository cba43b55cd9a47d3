//! Field descriptors: the declarative unit every form is built from.

use derive_more::Display;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

use super::FormValues;

/// Names of the fields that refer to a counterpart user. When the form is
/// opened with one of them already set, the field is locked.
pub const RELATIONAL_FIELDS: [&str; 2] = ["doctorId", "patientId"];

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{label}")]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Input kind. `Select` carries its ordered option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Date,
    Time,
    Tel,
    Hidden,
    Select(Vec<SelectOption>),
}

impl FieldKind {
    /// HTML-style input type name.
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::Tel => "tel",
            FieldKind::Hidden => "hidden",
            FieldKind::Select(_) => "select",
        }
    }
}

pub type Predicate = Arc<dyn Fn(&FormValues) -> bool + Send + Sync>;
pub type CustomCheck = Arc<dyn Fn(&str, &FormValues) -> Result<(), String> + Send + Sync>;

/// Validation rule. Rules of a field run in declaration order and the first
/// failure wins. `Pattern` and `MinLength` only apply to non-empty values.
#[derive(Clone)]
pub enum Rule {
    Required(String),
    Pattern { regex: Regex, message: String },
    MinLength { min: usize, message: String },
    /// Equality with the live value of another field.
    MatchesField { field: String, message: String },
    Custom(CustomCheck),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required(message) => f.debug_tuple("Required").field(message).finish(),
            Rule::Pattern { regex, message } => f
                .debug_struct("Pattern")
                .field("regex", &regex.as_str())
                .field("message", message)
                .finish(),
            Rule::MinLength { min, message } => f
                .debug_struct("MinLength")
                .field("min", min)
                .field("message", message)
                .finish(),
            Rule::MatchesField { field, message } => f
                .debug_struct("MatchesField")
                .field("field", field)
                .field("message", message)
                .finish(),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Visibility predicate over the live values of the fields it names.
///
/// The predicate only sees the fields listed in `depends_on`, all of which
/// must belong to the same form.
#[derive(Clone)]
pub struct Condition {
    depends_on: Vec<String>,
    predicate: Predicate,
}

impl Condition {
    pub fn new(
        depends_on: &[&str],
        predicate: impl Fn(&FormValues) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            depends_on: depends_on.iter().map(|name| name.to_string()).collect(),
            predicate: Arc::new(predicate),
        }
    }

    /// Visible while `field` holds exactly `expected`.
    pub fn equals(field: &str, expected: &str) -> Self {
        let owned_field = field.to_string();
        let expected = expected.to_string();
        Self::new(&[field], move |values| {
            values.get(&owned_field) == Some(expected.as_str())
        })
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn evaluate(&self, values: &FormValues) -> bool {
        let visible_to_predicate = values.restricted_to(&self.depends_on);
        (self.predicate)(&visible_to_predicate)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub rules: Vec<Rule>,
    pub condition: Option<Condition>,
}

impl FieldDescriptor {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            placeholder: None,
            rules: Vec::new(),
            condition: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub fn password(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    pub fn date(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn time(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Time)
    }

    pub fn tel(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Tel)
    }

    pub fn hidden(name: &str) -> Self {
        Self::new(name, "", FieldKind::Hidden)
    }

    pub fn select(name: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self::new(name, label, FieldKind::Select(options))
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn required(mut self, message: &str) -> Self {
        self.rules.push(Rule::Required(message.to_string()));
        self
    }

    pub fn pattern(mut self, regex: Regex, message: &str) -> Self {
        self.rules.push(Rule::Pattern {
            regex,
            message: message.to_string(),
        });
        self
    }

    pub fn min_length(mut self, min: usize, message: &str) -> Self {
        self.rules.push(Rule::MinLength {
            min,
            message: message.to_string(),
        });
        self
    }

    pub fn matches(mut self, field: &str, message: &str) -> Self {
        self.rules.push(Rule::MatchesField {
            field: field.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn custom(
        mut self,
        check: impl Fn(&str, &FormValues) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule::Custom(Arc::new(check)));
        self
    }

    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn is_relational(&self) -> bool {
        RELATIONAL_FIELDS.contains(&self.name.as_str())
    }

    pub fn options(&self) -> Option<&[SelectOption]> {
        match &self.kind {
            FieldKind::Select(options) => Some(options),
            _ => None,
        }
    }

    /// Fields this descriptor reads besides its own value.
    pub(crate) fn references(&self) -> impl Iterator<Item = &str> {
        let from_condition = self
            .condition
            .iter()
            .flat_map(|condition| condition.depends_on().iter().map(String::as_str));
        let from_rules = self.rules.iter().filter_map(|rule| match rule {
            Rule::MatchesField { field, .. } => Some(field.as_str()),
            _ => None,
        });
        from_condition.chain(from_rules)
    }
}
