//! Profile editor of the signed-in account.

use log::info;
use serde_json::Value;
use std::sync::Arc;

use super::{PageError, Services};
use crate::api::UsersApi;
use crate::forms::{catalog, Form, FormValues};
use crate::models::{date_part, User};
use crate::session::{SessionError, SessionStore};
use crate::utils::error_messages::{PROFILE_UPDATED, PROFILE_UPDATE_FAILED};

pub struct ProfilePage {
    services: Services,
    user: User,
    form: Form,
}

impl ProfilePage {
    pub fn open(services: &Services) -> Result<Self, PageError> {
        let user = services.current_user()?;
        let form = Form::new(catalog::profile_fields(user.role), profile_defaults(&user)?)?
            .with_labels("Save Changes", "Saving...");
        Ok(Self {
            services: services.clone(),
            user,
            form,
        })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Sends the form to `PUT /users/:id` and keeps the stored identity in
    /// step with what the server saved. The form is re-bound to the result.
    pub async fn save(&mut self) -> Result<&User, PageError> {
        let users = self.services.users.clone();
        let session = self.services.session.clone();
        let id = self.user.id.clone();

        let outcome = self
            .form
            .submit_with(|payload| save_profile(users, session, id, payload))
            .await;

        match outcome {
            Ok(user) => {
                self.services.notifier.success(PROFILE_UPDATED);
                self.form.reset(profile_defaults(&user)?);
                self.user = user;
                Ok(&self.user)
            }
            Err(e) => Err(self.services.report(e.into(), PROFILE_UPDATE_FAILED)),
        }
    }
}

async fn save_profile(
    users: UsersApi,
    session: Arc<SessionStore>,
    id: String,
    payload: Value,
) -> Result<User, PageError> {
    let saved = users.update(&id, &payload).await?;
    let Value::Object(fields) = serde_json::to_value(&saved).map_err(SessionError::from)? else {
        return Err(PageError::NotFound(id));
    };
    let user = session.update_local_user(&fields)?;
    info!("Profile of {} updated", user.email);
    Ok(user)
}

/// The user's own attributes, with the birth date cut down to `YYYY-MM-DD`.
fn profile_defaults(user: &User) -> Result<FormValues, PageError> {
    let json = serde_json::to_value(user).map_err(SessionError::from)?;
    let mut defaults = FormValues::from_json(&json);
    if let Some(birth) = &user.date_of_birth {
        defaults.set("dateOfBirth", date_part(birth));
    }
    Ok(defaults)
}
