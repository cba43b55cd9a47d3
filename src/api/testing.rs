//! Scripted transport for tests.

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use super::{ApiRequest, ApiResponse, Transport, TransportError};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

/// Answers every request through a closure and remembers what was sent.
pub(crate) struct ScriptedTransport {
    responder: Responder,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        responder: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let answer = (self.responder)(&request);
        self.sent.lock().unwrap().push(request);
        answer
    }
}

pub(crate) fn respond(status: u16, body: Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse {
        status: StatusCode::from_u16(status).unwrap(),
        body,
    })
}

pub(crate) fn offline() -> Result<ApiResponse, TransportError> {
    Err(TransportError("connection refused".to_string()))
}
