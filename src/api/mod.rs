//! Access to the portal REST API.
//!
//! Every call goes through [`ApiClient`], which attaches the bearer token and
//! turns a 401 into a forced logout. The endpoint groups in [`endpoints`]
//! give typed access to `/auth`, `/users`, `/appointments`,
//! `/medical-records` and `/prescriptions`.

mod client;
pub mod endpoints;
mod transport;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    ApiClient, ApiRequest, ApiResponse, BearerAuth, Interceptor, Transport, UnauthorizedGuard,
    UnauthorizedHook,
};
pub use endpoints::{
    AppointmentsApi, AuthApi, ListQuery, LoginResponse, MedicalRecordsApi, PrescriptionsApi,
    UsersApi,
};
pub use transport::HttpTransport;

use http::StatusCode;
use thiserror::Error;

/// The request never produced an HTTP answer.
#[derive(Debug, Error)]
#[error("Network error: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session expired, please login again")]
    Unauthorized { message: Option<String> },

    #[error("Request failed ({status})")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unexpected response from the server: {0}")]
    Decode(serde_json::Error),

    #[error("Request could not be encoded: {0}")]
    Encode(serde_json::Error),
}

impl ApiError {
    /// The `message` the server attached to its error answer, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Server message, or `fallback` when there is none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }
}
