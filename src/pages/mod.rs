//! Screen controllers.
//!
//! Each page owns its list state and its editor form, talks to the API
//! through [`Services`] and reports outcomes through the notifier. Pages do
//! not draw anything: a front-end renders their state.

pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod history;
pub mod menu;
pub mod prescriptions;
pub mod profile;
pub mod users;

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{
    ApiClient, ApiError, AppointmentsApi, AuthApi, MedicalRecordsApi, PrescriptionsApi, Transport,
    UsersApi,
};
use crate::forms::{FormError, SubmitError};
use crate::models::{Role, User};
use crate::notify::Notifier;
use crate::session::{SessionError, SessionStore};
use crate::storage::Storage;

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not available to a {0}")]
    Forbidden(Role),

    #[error("No active session")]
    NotAuthenticated,

    #[error("Unknown item `{0}`")]
    NotFound(String),

    #[error("Nothing is being edited")]
    NoEditor,
}

impl<E: Into<PageError>> From<SubmitError<E>> for PageError {
    fn from(e: SubmitError<E>) -> Self {
        match e {
            SubmitError::Form(e) => PageError::Form(e),
            SubmitError::Handler(e) => e.into(),
        }
    }
}

/// Everything a page needs, wired once per process.
#[derive(Clone)]
pub struct Services {
    pub session: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub auth: AuthApi,
    pub users: UsersApi,
    pub appointments: AppointmentsApi,
    pub records: MedicalRecordsApi,
    pub prescriptions: PrescriptionsApi,
}

impl Services {
    /// Builds the API client and the session store over `storage`, and
    /// routes the client's 401 handling to the store.
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Arc<Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let client = ApiClient::new(transport, storage.clone());
        let auth = AuthApi::new(client.clone());
        let session = Arc::new(SessionStore::new(
            storage,
            Arc::new(auth.clone()),
            notifier.clone(),
        ));
        client.on_unauthorized(session.invalidation_hook());

        Self {
            session,
            notifier,
            auth,
            users: UsersApi::new(client.clone()),
            appointments: AppointmentsApi::new(client.clone()),
            records: MedicalRecordsApi::new(client.clone()),
            prescriptions: PrescriptionsApi::new(client),
        }
    }

    pub fn current_user(&self) -> Result<User, PageError> {
        self.session
            .current_user()
            .ok_or(PageError::NotAuthenticated)
    }

    /// Notifies the failure of a non-auth operation and hands it back.
    pub(crate) fn report(&self, e: PageError, fallback: &str) -> PageError {
        let message = match &e {
            PageError::Api(api) => api.message_or(fallback).to_string(),
            _ => fallback.to_string(),
        };
        self.notifier.error(&message);
        e
    }
}

/// Text value of a submitted field, empty when missing.
pub(crate) fn submitted_text<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::api::testing::respond;
    use serde_json::json;

    #[tokio::test]
    async fn test_unauthorized_response_ends_the_session() {
        let patient = user("p1", Role::Patient, "Paula");
        let (services, _, _) = services_as(&patient, |_| respond(401, json!({})));
        assert!(services.session.snapshot().is_authenticated());

        let result = services.users.get("p1").await;

        assert!(matches!(result, Err(ApiError::Unauthorized { message: None })));
        assert!(!services.session.snapshot().is_authenticated());
        assert!(matches!(
            services.current_user(),
            Err(PageError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_report_prefers_server_message() {
        let admin = user("a1", Role::Admin, "Ada");
        let (services, _, notifier) = services_as(&admin, |_| respond(200, json!({})));

        services.report(
            PageError::Api(ApiError::Status {
                status: http::StatusCode::CONFLICT,
                message: Some("Already booked".to_string()),
            }),
            "fallback",
        );
        services.report(PageError::NoEditor, "fallback");

        let messages: Vec<String> = notifier.take().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["Already booked", "fallback"]);
    }
}
