//! HTTP transport seam.
//!
//! Queue operations build an [`ApiRequest`] with a path relative to the
//! project endpoint and hand it to a [`Transport`]. The default
//! [`HttpTransport`] sends it with `reqwest`; callers can supply their own
//! implementation to add retries, metrics or request recording.

use crate::config::ClientConfig;
use crate::error::{ConfigurationError, QueueError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// JSON media type sent on every request, without a charset parameter.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP methods used by the REST surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request against the project endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path relative to the project endpoint, including any query string
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            body: None,
        }
    }

    /// DELETE carrying a JSON body, used to remove subscribers
    pub fn delete_with_body(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the queue service.
///
/// Implementations report any HTTP status as an [`ApiResponse`]; only
/// failures to obtain a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, QueueError>;
}

/// `reqwest` transport authenticating with the project's OAuth token
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    endpoint: String,
    token: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from validated client configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid or the
    /// HTTP client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint(),
            token: config.token.clone(),
            timeout: config.timeout,
        })
    }

    /// Project endpoint every request path is resolved against
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn map_error(&self, error: reqwest::Error) -> QueueError {
        if error.is_timeout() {
            QueueError::Timeout {
                duration: self.timeout,
            }
        } else {
            QueueError::Transport {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, QueueError> {
        let url = self.url(&request.path);

        let mut builder = match request.method {
            HttpMethod::Get => self.http_client.get(&url),
            HttpMethod::Post => self.http_client.post(&url),
            HttpMethod::Delete => self.http_client.delete(&url),
        };
        builder = builder
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        debug!(method = %request.method, path = %request.path, "Sending request");

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        debug!(
            method = %request.method,
            path = %request.path,
            status,
            "Received response"
        );

        Ok(ApiResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
