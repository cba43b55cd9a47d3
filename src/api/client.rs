//! HTTP client abstraction: a pluggable transport behind a chain of
//! request/response interceptors.

use async_trait::async_trait;
use http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Method, StatusCode};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

use super::{ApiError, TransportError};
use crate::storage::Storage;

/// Invoked when the API reports that the session is no longer valid.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Sends one request and hands back whatever the server answered,
/// error statuses included.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// A middleware stage. Request hooks run in registration order before the
/// transport, response hooks after it.
pub trait Interceptor: Send + Sync {
    fn on_request(&self, _request: &mut ApiRequest) {}

    fn on_response(&self, _response: &ApiResponse) {}
}

/// Attaches `Authorization: Bearer <token>` whenever a token is stored.
pub struct BearerAuth {
    storage: Arc<Storage>,
}

impl BearerAuth {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl Interceptor for BearerAuth {
    fn on_request(&self, request: &mut ApiRequest) {
        let Some(token) = self.storage.credentials().token else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored token is not a valid header value, request sent anonymously"),
        }
    }
}

/// Forced logout on any 401: drops the persisted credentials, then runs the
/// hook installed by whoever owns the in-memory session.
pub struct UnauthorizedGuard {
    storage: Arc<Storage>,
    hook: OnceLock<UnauthorizedHook>,
}

impl UnauthorizedGuard {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            hook: OnceLock::new(),
        }
    }
}

impl Interceptor for UnauthorizedGuard {
    fn on_response(&self, response: &ApiResponse) {
        if response.status != StatusCode::UNAUTHORIZED {
            return;
        }
        warn!("API answered 401, discarding the session");
        if let Err(e) = self.storage.clear_credentials() {
            warn!("Could not clear stored credentials: {e}");
        }
        if let Some(hook) = self.hook.get() {
            hook();
        }
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    guard: Arc<UnauthorizedGuard>,
}

/// Cheap to clone; every clone shares transport and interceptors.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<Storage>) -> Self {
        Self::with_interceptors(transport, storage, Vec::new())
    }

    /// Extra interceptors run after the bearer stage and before the 401 guard.
    pub fn with_interceptors(
        transport: Arc<dyn Transport>,
        storage: Arc<Storage>,
        extra: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        let guard = Arc::new(UnauthorizedGuard::new(storage.clone()));

        let mut interceptors: Vec<Arc<dyn Interceptor>> = vec![Arc::new(BearerAuth::new(storage))];
        interceptors.extend(extra);
        interceptors.push(guard.clone());

        Self {
            inner: Arc::new(Inner {
                transport,
                interceptors,
                guard,
            }),
        }
    }

    /// Installs the forced-logout callback. Only the first call has an effect.
    pub fn on_unauthorized(&self, hook: UnauthorizedHook) {
        if self.inner.guard.hook.set(hook).is_err() {
            warn!("Unauthorized hook already installed, ignoring");
        }
    }

    pub async fn send(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        for interceptor in &self.inner.interceptors {
            interceptor.on_request(&mut request);
        }

        debug!("{} {}", request.method, request.path);
        let response = self.inner.transport.send(request).await?;

        for interceptor in &self.inner.interceptors {
            interceptor.on_response(&response);
        }

        let message = || {
            response
                .body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        if response.status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized { message: message() });
        }
        if !response.status.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                message: message(),
            });
        }
        Ok(response.body)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let body = self
            .send(ApiRequest::new(Method::GET, path).with_query(query))
            .await?;
        serde_json::from_value(body).map_err(ApiError::Decode)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        let answer = self
            .send(ApiRequest::new(Method::POST, path).with_body(body))
            .await?;
        serde_json::from_value(answer).map_err(ApiError::Decode)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        let answer = self
            .send(ApiRequest::new(Method::PUT, path).with_body(body))
            .await?;
        serde_json::from_value(answer).map_err(ApiError::Decode)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::new(Method::DELETE, path)).await?;
        Ok(())
    }
}
