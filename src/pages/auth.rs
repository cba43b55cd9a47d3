//! Login and registration screens.

use log::info;
use std::str::FromStr;

use super::{submitted_text, PageError, Services};
use crate::authorization::{home_for_role, navigate, Navigation, LOGIN_PATH};
use crate::forms::{catalog, Form, FormError, FormValues};
use crate::models::{NewUser, Role};
use crate::utils::input_validation::is_blank;

pub struct LoginPage {
    form: Form,
    /// Location the visitor was turned away from, if any.
    from: Option<String>,
}

impl LoginPage {
    /// Mounting the screen re-reads the stored session.
    pub fn open(services: &Services, from: Option<String>) -> Result<Self, PageError> {
        services.session.initialize();
        let form = Form::new(catalog::login_fields(), FormValues::new())?
            .with_labels("Sign In", "Signing in...");
        Ok(Self { form, from })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Logs in and returns where to go next: the location the visitor was
    /// sent away from when the new session may see it, else their home.
    pub async fn submit(&mut self, services: &Services) -> Result<String, PageError> {
        let session = services.session.clone();
        let user = self
            .form
            .submit_with(|payload| async move {
                session
                    .login(
                        submitted_text(&payload, "email"),
                        submitted_text(&payload, "password"),
                    )
                    .await
            })
            .await?;

        let home = home_for_role(user.role).to_string();
        let snapshot = services.session.snapshot();
        let next = self
            .from
            .as_deref()
            .and_then(|from| match navigate(&snapshot, from) {
                Navigation::Render(route) => Some(route.path()),
                Navigation::Redirect { .. } => None,
            })
            .unwrap_or(home);

        info!("{} signed in, going to {next}", user.email);
        Ok(next)
    }
}

pub struct RegisterPage {
    form: Form,
}

impl RegisterPage {
    pub fn open() -> Result<Self, PageError> {
        let form = Form::new(catalog::register_fields(), FormValues::new())?
            .with_labels("Create Account", "Creating Account...");
        Ok(Self { form })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Creates the account and returns the login location. Doctor-only
    /// attributes are only sent for doctors.
    pub async fn submit(&mut self, services: &Services) -> Result<String, PageError> {
        let session = services.session.clone();
        self.form
            .submit_with(|payload| async move {
                let raw_role = submitted_text(&payload, "role");
                let Ok(role) = Role::from_str(raw_role) else {
                    return Err(PageError::Form(FormError::InvalidOption {
                        field: "role".to_string(),
                        value: raw_role.to_string(),
                    }));
                };
                let optional = |key: &str| {
                    let value = submitted_text(&payload, key);
                    (!is_blank(value)).then(|| value.to_string())
                };
                let is_doctor = role == Role::Doctor;

                let user = NewUser {
                    email: submitted_text(&payload, "email").to_string(),
                    full_name: submitted_text(&payload, "fullName").to_string(),
                    role,
                    phone: optional("phone"),
                    specialization: optional("specialization").filter(|_| is_doctor),
                    license_number: optional("licenseNumber").filter(|_| is_doctor),
                };

                session
                    .register(&user, submitted_text(&payload, "password"))
                    .await
                    .map_err(PageError::from)
            })
            .await?;

        Ok(LOGIN_PATH.to_string())
    }
}
