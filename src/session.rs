//! Session store: the single owner of "who is logged in".
//!
//! The store keeps the identity and its bearer token as one value, so a
//! session is either complete or absent. Every write goes to durable storage
//! before the call returns; the in-memory copy is rehydrated from there by
//! [`SessionStore::initialize`].

use async_trait::async_trait;
use log::{info, warn};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::api::{ApiError, AuthApi, LoginResponse, UnauthorizedHook};
use crate::models::{NewUser, User};
use crate::notify::Notifier;
use crate::storage::{Storage, StorageError, StoredCredentials};
use crate::utils::error_messages::{
    LOGIN_FAILED, LOGIN_SUCCESS, LOGOUT_FAILED, LOGOUT_SUCCESS, REGISTRATION_FAILED,
    REGISTRATION_SUCCESS,
};

/// Keys of the stored identity that a local update may not touch.
const IMMUTABLE_USER_KEYS: [&str; 2] = ["_id", "role"];

/// The server side of authentication, as seen by the store.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn register(&self, user: &NewUser, password: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Stored identity is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("No active session")]
    NotAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Read-only view of the session, handed to the route guard and the pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
}

impl Session {
    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
            is_loading: false,
        }
    }

    /// The user, but only when a token goes with it.
    pub fn identity(&self) -> Option<&User> {
        match (&self.user, &self.token) {
            (Some(user), Some(_)) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Identity {
    user: User,
    token: String,
}

#[derive(Debug, Default)]
struct State {
    identity: Option<Identity>,
    is_loading: bool,
}

pub struct SessionStore {
    storage: Arc<Storage>,
    authenticator: Arc<dyn Authenticator>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<State>,
}

impl SessionStore {
    pub fn new(
        storage: Arc<Storage>,
        authenticator: Arc<dyn Authenticator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            authenticator,
            notifier,
            state: RwLock::default(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_loading(&self, is_loading: bool) {
        self.write().is_loading = is_loading;
    }

    pub fn snapshot(&self) -> Session {
        let state = self.read();
        Session {
            user: state.identity.as_ref().map(|i| i.user.clone()),
            token: state.identity.as_ref().map(|i| i.token.clone()),
            is_loading: state.is_loading,
        }
    }

    pub fn state(&self) -> SessionState {
        let state = self.read();
        if state.is_loading {
            SessionState::Authenticating
        } else if state.identity.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().identity.as_ref().map(|i| i.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.read().identity.as_ref().map(|i| i.token.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// Rehydrates the in-memory session from storage. Safe to call any number
    /// of times: the result only depends on what is stored.
    pub fn initialize(&self) {
        let StoredCredentials { token, user } = self.storage.credentials();

        let identity = match (token, user) {
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(Identity { user, token }),
                Err(e) => {
                    warn!("Stored identity is unreadable ({e}), discarding the session");
                    self.discard_stored();
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("Half a session was stored, discarding it");
                self.discard_stored();
                None
            }
        };

        if let Some(identity) = &identity {
            info!("Session restored for {}", identity.user.email);
        }
        self.write().identity = identity;
    }

    fn discard_stored(&self) {
        if let Err(e) = self.storage.clear_credentials() {
            warn!("Could not clear stored credentials: {e}");
        }
    }

    /// Authenticates and persists the session. On failure the previous state
    /// is kept, the error is notified and handed back to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.set_loading(true);

        let response = match self.authenticator.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                self.set_loading(false);
                warn!("Login failed for {email}: {e}");
                self.notifier.error(e.message_or(LOGIN_FAILED));
                return Err(e.into());
            }
        };

        if let Err(e) = self.persist(&response.token, &response.user) {
            self.set_loading(false);
            self.notifier.error(LOGIN_FAILED);
            return Err(e);
        }

        let LoginResponse { token, user } = response;
        {
            let mut state = self.write();
            state.identity = Some(Identity {
                user: user.clone(),
                token,
            });
            state.is_loading = false;
        }

        info!("Logged in as {} ({})", user.email, user.role);
        self.notifier.success(LOGIN_SUCCESS);
        Ok(user)
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user)?;
        self.storage.store_credentials(token, &raw)?;
        Ok(())
    }

    /// Local only: forgets the session and its persisted copy. When the
    /// persisted copy cannot be cleared the session is kept as it was.
    pub fn logout(&self) -> Result<(), SessionError> {
        if let Err(e) = self.storage.clear_credentials() {
            warn!("Logout could not clear storage: {e}");
            self.notifier.error(LOGOUT_FAILED);
            return Err(e.into());
        }
        {
            let mut state = self.write();
            state.identity = None;
            state.is_loading = false;
        }

        info!("Logged out");
        self.notifier.success(LOGOUT_SUCCESS);
        Ok(())
    }

    /// Creates an account. Does not log in: the caller must do so explicitly.
    pub async fn register(&self, user: &NewUser, password: &str) -> Result<(), SessionError> {
        self.set_loading(true);
        let result = self.authenticator.register(user, password).await;
        self.set_loading(false);

        match result {
            Ok(()) => {
                info!("Registered {} as {}", user.email, user.role);
                self.notifier.success(REGISTRATION_SUCCESS);
                Ok(())
            }
            Err(e) => {
                warn!("Registration failed for {}: {e}", user.email);
                self.notifier.error(e.message_or(REGISTRATION_FAILED));
                Err(e.into())
            }
        }
    }

    /// Shallow-merges `partial` into the stored identity (last write wins per
    /// key) and writes it back. Id and role are kept as they were; the token
    /// is untouched.
    pub fn update_local_user(&self, partial: &Map<String, Value>) -> Result<User, SessionError> {
        let StoredCredentials { token, user } = self.storage.credentials();
        let (Some(token), Some(raw)) = (token, user) else {
            return Err(SessionError::NotAuthenticated);
        };

        let mut merged: Map<String, Value> = serde_json::from_str(&raw)?;
        for (key, value) in partial {
            if !IMMUTABLE_USER_KEYS.contains(&key.as_str()) {
                merged.insert(key.clone(), value.clone());
            }
        }

        let user: User = serde_json::from_value(Value::Object(merged))?;
        self.persist(&token, &user)?;
        self.write().identity = Some(Identity {
            user: user.clone(),
            token,
        });
        Ok(user)
    }

    /// Re-reads the identity from `/auth/me` and stores the server's version.
    pub async fn refresh_user(&self, auth: &AuthApi) -> Result<User, SessionError> {
        if self.token().is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        let fresh = auth.me().await?;
        match serde_json::to_value(&fresh)? {
            Value::Object(fields) => self.update_local_user(&fields),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    /// Drops the session without any notification. Used when the API reports
    /// the token as invalid.
    pub fn force_logout(&self) {
        self.discard_stored();
        let mut state = self.write();
        if state.identity.take().is_some() {
            warn!("Session invalidated by the server");
        }
        state.is_loading = false;
    }

    /// Hook for [`crate::api::ApiClient::on_unauthorized`]. Holds the store
    /// weakly, so the client never keeps it alive.
    pub fn invalidation_hook(self: &Arc<Self>) -> UnauthorizedHook {
        let store = Arc::downgrade(self);
        Arc::new(move || {
            if let Some(store) = store.upgrade() {
                store.force_logout();
            }
        })
    }
}
