//! `reqwest` implementation of the transport.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{ApiRequest, ApiResponse, Transport, TransportError};

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        // Error pages are not always JSON; the status is what matters then
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }
}
