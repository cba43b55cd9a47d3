use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;

use super::field::{FieldDescriptor, FieldKind, Rule, SelectOption};
use super::{FormError, FormValues, SubmitError, ValidationErrors};
use crate::utils::input_validation::{is_blank, meets_min_length};

const DEFAULT_SUBMIT_LABEL: &str = "Submit";
const DEFAULT_LOADING_LABEL: &str = "Submitting...";

/// What a front-end should draw for one visible field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Input {
        input_type: &'static str,
        value: String,
        placeholder: Option<String>,
    },
    /// `options` starts with the empty placeholder entry.
    Select {
        options: Vec<SelectOption>,
        selected: String,
    },
    /// Non-editable display of a pre-selected counterpart. `hidden_value`
    /// is the id carried into the submission.
    Locked {
        display: String,
        hidden_value: String,
    },
    Hidden {
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub control: Control,
    pub error: Option<String>,
}

impl RenderedField {
    pub fn is_editable(&self) -> bool {
        matches!(self.control, Control::Input { .. } | Control::Select { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

/// A mounted form: descriptors, the defaults it is bound to and its live
/// values.
#[derive(Debug)]
pub struct Form {
    fields: Vec<FieldDescriptor>,
    defaults: FormValues,
    values: FormValues,
    errors: BTreeMap<String, String>,
    is_loading: bool,
    submit_label: String,
    loading_label: String,
}

impl Form {
    /// Checks the descriptor list and binds it to `defaults`.
    ///
    /// Names must be unique, every referenced field must be part of the
    /// list, and no name may be the dotted prefix of another one.
    pub fn new(fields: Vec<FieldDescriptor>, defaults: FormValues) -> Result<Self, FormError> {
        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }

        for field in &fields {
            for dependency in field.references() {
                if dependency == field.name || !names.contains(dependency) {
                    return Err(FormError::UnknownDependency {
                        field: field.name.clone(),
                        dependency: dependency.to_string(),
                    });
                }
            }
            let prefix = format!("{}.", field.name);
            if names.iter().any(|other| other.starts_with(&prefix)) {
                return Err(FormError::ConflictingPath(field.name.clone()));
            }
        }

        Ok(Self {
            fields,
            values: defaults.clone(),
            defaults,
            errors: BTreeMap::new(),
            is_loading: false,
            submit_label: DEFAULT_SUBMIT_LABEL.to_string(),
            loading_label: DEFAULT_LOADING_LABEL.to_string(),
        })
    }

    pub fn with_labels(mut self, submit: &str, loading: &str) -> Self {
        self.submit_label = submit.to_string();
        self.loading_label = loading.to_string();
        self
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn defaults(&self) -> &FormValues {
        &self.defaults
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Re-binds the form to new defaults: live values are replaced and
    /// pending errors dropped.
    pub fn reset(&mut self, defaults: FormValues) {
        debug!("Form reset with {} default value(s)", defaults.iter().count());
        self.values = defaults.clone();
        self.defaults = defaults;
        self.errors.clear();
    }

    /// Edits one live value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        if self.is_locked(field) {
            return Err(FormError::FieldLocked(name.to_string()));
        }
        if let Some(options) = field.options() {
            if !value.is_empty() && !options.iter().any(|option| option.value == value) {
                return Err(FormError::InvalidOption {
                    field: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        self.values.set(name, value);
        self.errors.remove(name);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_visible(&self, field: &FieldDescriptor) -> bool {
        field
            .condition
            .as_ref()
            .map_or(true, |condition| condition.evaluate(&self.values))
    }

    /// A relational field is locked when the form was opened with its id.
    pub fn is_locked(&self, field: &FieldDescriptor) -> bool {
        field.is_relational() && self.defaults.get(&field.name).is_some_and(|id| !is_blank(id))
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| self.is_visible(field))
    }

    pub fn render(&self) -> Vec<RenderedField> {
        self.visible_fields()
            .map(|field| RenderedField {
                name: field.name.clone(),
                label: field.label.clone(),
                control: self.control_for(field),
                error: self.errors.get(&field.name).cloned(),
            })
            .collect()
    }

    fn control_for(&self, field: &FieldDescriptor) -> Control {
        let value = self.values.get(&field.name).unwrap_or_default().to_string();

        if self.is_locked(field) {
            return Control::Locked {
                display: locked_display(&field.name),
                hidden_value: self.defaults.get(&field.name).unwrap_or_default().to_string(),
            };
        }

        match &field.kind {
            FieldKind::Select(options) => {
                let mut with_placeholder = Vec::with_capacity(options.len() + 1);
                with_placeholder.push(SelectOption::new(
                    field.placeholder.clone().unwrap_or_default(),
                    "",
                ));
                with_placeholder.extend(options.iter().cloned());
                Control::Select {
                    options: with_placeholder,
                    selected: value,
                }
            }
            FieldKind::Hidden => Control::Hidden { value },
            kind => Control::Input {
                input_type: kind.input_type(),
                value,
                placeholder: field.placeholder.clone(),
            },
        }
    }

    /// Runs every rule of every visible field against the live values.
    /// Errors are kept for `render` and returned.
    pub fn validate(&mut self) -> Result<(), ValidationErrors> {
        let mut errors = BTreeMap::new();

        for field in self.visible_fields() {
            if self.is_locked(field) {
                continue;
            }
            let value = self.values.get(&field.name).unwrap_or_default();
            if let Some(message) = self.check_field(field, value) {
                errors.insert(field.name.clone(), message);
            }
        }

        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    fn check_field(&self, field: &FieldDescriptor, value: &str) -> Option<String> {
        for rule in &field.rules {
            let failed = match rule {
                Rule::Required(message) => is_blank(value).then(|| message.clone()),
                Rule::MinLength { min, message } => {
                    (!value.is_empty() && !meets_min_length(value, *min)).then(|| message.clone())
                }
                Rule::Pattern { regex, message } => {
                    (!value.is_empty() && !regex.is_match(value)).then(|| message.clone())
                }
                Rule::MatchesField { field: other, message } => {
                    (self.values.get(other).unwrap_or_default() != value).then(|| message.clone())
                }
                Rule::Custom(check) => check(value, &self.values).err(),
            };
            if failed.is_some() {
                return failed;
            }
        }

        if let Some(options) = field.options() {
            if !value.is_empty() && !options.iter().any(|option| option.value == value) {
                return Some(format!("{} has an invalid value", field.label));
            }
        }

        None
    }

    /// Validates, then assembles the nested submission object made of the
    /// fields visible right now. Locked fields carry their default id.
    pub fn submit(&mut self) -> Result<Value, FormError> {
        if self.is_loading {
            return Err(FormError::Busy);
        }
        self.validate()?;

        let entries: Vec<(&str, &str)> = self
            .visible_fields()
            .map(|field| {
                let source = if self.is_locked(field) {
                    &self.defaults
                } else {
                    &self.values
                };
                (
                    field.name.as_str(),
                    source.get(&field.name).unwrap_or_default(),
                )
            })
            .collect();

        FormValues::expand(entries)
    }

    /// Submits and hands the object to `on_submit`, keeping the form in its
    /// loading state until the handler settles. The live values survive a
    /// failed handler so the user can retry.
    pub async fn submit_with<F, Fut, T, E>(&mut self, on_submit: F) -> Result<T, SubmitError<E>>
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let payload = self.submit().map_err(SubmitError::Form)?;

        self.is_loading = true;
        let outcome = on_submit(payload).await;
        self.is_loading = false;

        outcome.map_err(SubmitError::Handler)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn submit_button(&self) -> SubmitButton {
        SubmitButton {
            label: if self.is_loading {
                self.loading_label.clone()
            } else {
                self.submit_label.clone()
            },
            disabled: self.is_loading,
        }
    }
}

fn locked_display(name: &str) -> String {
    match name {
        "patientId" => "Patient already selected".to_string(),
        _ => "Doctor already selected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::field::Condition;
    use crate::forms::catalog;
    use crate::models::Role;
    use serde_json::json;

    fn role_dependent_form() -> Form {
        Form::new(
            vec![
                FieldDescriptor::select(
                    "role",
                    "Role",
                    vec![
                        SelectOption::new("Patient", "patient"),
                        SelectOption::new("Doctor", "doctor"),
                    ],
                )
                .placeholder("Select your role")
                .required("Role is required"),
                FieldDescriptor::text("licenseNumber", "License Number")
                    .required("License number is required for doctors")
                    .visible_when(Condition::equals("role", "doctor")),
            ],
            FormValues::new(),
        )
        .unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn test_duplicate_names_rejected() {
            let result = Form::new(
                vec![
                    FieldDescriptor::text("reason", "Reason"),
                    FieldDescriptor::text("reason", "Reason again"),
                ],
                FormValues::new(),
            );
            assert!(matches!(result, Err(FormError::DuplicateField(name)) if name == "reason"));
        }

        #[test]
        fn test_dependency_outside_the_list_rejected() {
            let result = Form::new(
                vec![FieldDescriptor::text("licenseNumber", "License")
                    .visible_when(Condition::equals("role", "doctor"))],
                FormValues::new(),
            );
            assert!(matches!(result, Err(FormError::UnknownDependency { .. })));
        }

        #[test]
        fn test_self_dependency_rejected() {
            let result = Form::new(
                vec![FieldDescriptor::text("role", "Role")
                    .visible_when(Condition::equals("role", "doctor"))],
                FormValues::new(),
            );
            assert!(matches!(result, Err(FormError::UnknownDependency { .. })));
        }

        #[test]
        fn test_prefix_conflict_rejected() {
            let result = Form::new(
                vec![
                    FieldDescriptor::text("vitalSigns", "Vitals"),
                    FieldDescriptor::text("vitalSigns.weight", "Weight"),
                ],
                FormValues::new(),
            );
            assert!(matches!(result, Err(FormError::ConflictingPath(_))));
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn test_select_gets_leading_placeholder() {
            let form = role_dependent_form();
            let rendered = form.render();

            match &rendered[0].control {
                Control::Select { options, selected } => {
                    assert_eq!(options[0], SelectOption::new("Select your role", ""));
                    assert_eq!(options.len(), 3);
                    assert_eq!(selected, "");
                }
                other => panic!("Expected a select, got {other:?}"),
            }
        }

        #[test]
        fn test_hidden_fields_are_not_rendered() {
            let mut form = role_dependent_form();
            assert_eq!(form.render().len(), 1);

            form.set("role", "doctor").unwrap();
            assert_eq!(form.render().len(), 2);
        }

        #[test]
        fn test_reset_repopulates_values() {
            let mut form = Form::new(catalog::appointment_fields(), FormValues::new()).unwrap();
            form.reset(FormValues::from_pairs([("reason", "Cold")]));
            form.set("reason", "Fever").unwrap();

            form.reset(FormValues::from_pairs([("reason", "Checkup")]));

            assert_eq!(form.value("reason"), Some("Checkup"));
            assert_eq!(form.defaults().get("reason"), Some("Checkup"));
        }

        #[test]
        fn test_reset_drops_errors() {
            let mut form = Form::new(catalog::appointment_fields(), FormValues::new()).unwrap();
            assert!(form.validate().is_err());
            assert!(form.error("reason").is_some());

            form.reset(FormValues::new());
            assert!(form.error("reason").is_none());
        }

        #[test]
        fn test_invalid_option_rejected() {
            let mut form = role_dependent_form();
            let result = form.set("role", "nurse");
            assert!(matches!(result, Err(FormError::InvalidOption { .. })));
            assert!(form.set("role", "").is_ok(), "Clearing a select was rejected");
        }

        #[test]
        fn test_unknown_field_rejected() {
            let mut form = role_dependent_form();
            assert!(matches!(form.set("nope", "x"), Err(FormError::UnknownField(_))));
        }
    }

    mod locking {
        use super::*;

        #[test]
        fn test_preselected_doctor_is_locked() {
            let mut form = Form::new(
                catalog::appointment_fields(),
                FormValues::from_pairs([("doctorId", "d1")]),
            )
            .unwrap();

            let rendered = form.render();
            assert_eq!(
                rendered[0].control,
                Control::Locked {
                    display: "Doctor already selected".to_string(),
                    hidden_value: "d1".to_string(),
                }
            );
            assert!(!rendered[0].is_editable());
            assert!(matches!(form.set("doctorId", "d2"), Err(FormError::FieldLocked(_))));
        }

        #[test]
        fn test_locked_id_is_submitted_unchanged() {
            let mut form = Form::new(
                catalog::appointment_fields(),
                FormValues::from_pairs([("doctorId", "d1")]),
            )
            .unwrap();
            form.set("appointmentDate", "2025-03-05").unwrap();
            form.set("appointmentTime", "10:30").unwrap();
            form.set("reason", "Cold").unwrap();

            let submitted = form.submit().unwrap();
            assert_eq!(submitted["doctorId"], json!("d1"));
        }

        #[test]
        fn test_patient_lock_label() {
            let form = Form::new(
                catalog::prescription_fields(),
                FormValues::from_pairs([("patientId", "p1")]),
            )
            .unwrap();

            let patient = form
                .render()
                .into_iter()
                .find(|field| field.name == "patientId")
                .unwrap();
            assert!(matches!(
                patient.control,
                Control::Locked { ref display, .. } if display == "Patient already selected"
            ));
        }

        #[test]
        fn test_blank_default_does_not_lock() {
            let form = Form::new(
                catalog::appointment_fields(),
                FormValues::from_pairs([("doctorId", "  ")]),
            )
            .unwrap();
            assert!(form.render()[0].is_editable());
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn test_whitespace_fails_required() {
            let mut form = Form::new(catalog::appointment_fields(), FormValues::new()).unwrap();
            form.set("reason", "   ").unwrap();

            let errors = form.validate().unwrap_err();
            assert_eq!(errors.get("reason"), Some("Reason is required"));
        }

        #[test]
        fn test_pattern_and_min_length() {
            let mut form = Form::new(catalog::register_fields(), FormValues::new()).unwrap();
            form.set("email", "not-an-email").unwrap();
            form.set("password", "abc").unwrap();

            let errors = form.validate().unwrap_err();
            assert_eq!(errors.get("email"), Some("Invalid email address"));
            assert_eq!(
                errors.get("password"),
                Some("Password must be at least 6 characters")
            );
        }

        #[test]
        fn test_confirmation_uses_live_password() {
            let mut form = Form::new(catalog::register_fields(), FormValues::new()).unwrap();
            form.set("fullName", "Ana").unwrap();
            form.set("email", "ana@healthcard.com").unwrap();
            form.set("role", "patient").unwrap();
            form.set("password", "secret1").unwrap();
            form.set("confirmPassword", "secret1").unwrap();
            assert!(form.validate().is_ok());

            form.set("password", "secret2").unwrap();
            let errors = form.validate().unwrap_err();
            assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));

            form.set("confirmPassword", "secret2").unwrap();
            assert!(form.submit().is_ok());
        }

        #[test]
        fn test_hidden_field_is_not_validated_nor_submitted() {
            let mut form = role_dependent_form();
            form.set("role", "doctor").unwrap();
            form.set("licenseNumber", "LIC-1").unwrap();
            form.set("role", "patient").unwrap();

            let submitted = form.submit().unwrap();
            assert_eq!(submitted, json!({"role": "patient"}));
        }

        #[test]
        fn test_errors_are_rendered_inline() {
            let mut form = role_dependent_form();
            form.set("role", "doctor").unwrap();
            assert!(form.submit().is_err());

            let rendered = form.render();
            assert_eq!(
                rendered[1].error.as_deref(),
                Some("License number is required for doctors")
            );

            form.set("licenseNumber", "LIC-1").unwrap();
            assert!(form.error("licenseNumber").is_none());
        }

        #[test]
        fn test_dotted_names_are_nested() {
            let mut form = Form::new(
                catalog::medical_record_fields(),
                FormValues::from_pairs([("doctorId", "d1"), ("patientId", "p1")]),
            )
            .unwrap();
            form.set("visitDate", "2025-03-05").unwrap();
            form.set("diagnosis", "Flu").unwrap();
            form.set("treatment", "Rest").unwrap();
            form.set("vitalSigns.heartRate", "72").unwrap();

            let submitted = form.submit().unwrap();
            assert_eq!(submitted["vitalSigns"]["heartRate"], json!("72"));
            assert_eq!(submitted["patientId"], json!("p1"));
        }

        #[test]
        fn test_profile_defaults_validate() {
            let defaults = FormValues::from_pairs([
                ("fullName", "Pat"),
                ("email", "pat@healthcard.com"),
                ("gender", "female"),
            ]);
            let mut form = Form::new(catalog::profile_fields(Role::Patient), defaults).unwrap();
            assert!(form.validate().is_ok());
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn test_button_while_loading() {
            let mut form = Form::new(catalog::login_fields(), FormValues::new())
                .unwrap()
                .with_labels("Sign In", "Signing in...");
            assert_eq!(
                form.submit_button(),
                SubmitButton {
                    label: "Sign In".to_string(),
                    disabled: false
                }
            );

            form.set_loading(true);
            assert_eq!(
                form.submit_button(),
                SubmitButton {
                    label: "Signing in...".to_string(),
                    disabled: true
                }
            );
            assert!(matches!(form.submit(), Err(FormError::Busy)));
        }

        #[tokio::test]
        async fn test_submit_with_handler() {
            let mut form = Form::new(catalog::login_fields(), FormValues::new()).unwrap();
            form.set("email", "ana@healthcard.com").unwrap();
            form.set("password", "secret1").unwrap();

            let echoed: Result<Value, SubmitError<String>> =
                form.submit_with(|payload| async move { Ok(payload) }).await;
            assert_eq!(echoed.unwrap()["email"], json!("ana@healthcard.com"));
            assert!(!form.is_loading());
        }

        #[tokio::test]
        async fn test_failed_handler_keeps_values() {
            let mut form = Form::new(catalog::login_fields(), FormValues::new()).unwrap();
            form.set("email", "ana@healthcard.com").unwrap();
            form.set("password", "wrong").unwrap();

            let result: Result<(), SubmitError<String>> = form
                .submit_with(|_| async { Err("Invalid credentials".to_string()) })
                .await;

            assert!(matches!(result, Err(SubmitError::Handler(_))));
            assert_eq!(form.value("email"), Some("ana@healthcard.com"));
            assert!(!form.is_loading());
        }

        #[tokio::test]
        async fn test_invalid_form_never_calls_handler() {
            let mut form = Form::new(catalog::login_fields(), FormValues::new()).unwrap();
            let mut called = false;

            let result: Result<(), SubmitError<String>> = form
                .submit_with(|_| {
                    called = true;
                    async { Ok(()) }
                })
                .await;

            assert!(matches!(
                result,
                Err(SubmitError::Form(FormError::Validation(_)))
            ));
            assert!(!called, "Handler ran for an invalid form");
        }
    }
}
