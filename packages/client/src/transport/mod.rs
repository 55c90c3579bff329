//! HTTP transport abstraction.
//!
//! The session client never talks to the network directly; it hands a
//! [`PostRequest`] to an [`HttpTransport`] and maps whatever comes back.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`ReqwestTransport`] | Real backends |
//! | [`ScriptedTransport`] | Tests; replays queued replies and records requests |
//!
//! [`ReqwestTransport`]: http::ReqwestTransport
//! [`ScriptedTransport`]: scripted::ScriptedTransport

pub mod http;
pub mod scripted;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// The request was sent (or attempted) but no successful response came back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    /// The backend answered with a non-2xx status.
    #[error("server returned status {0}")]
    BadStatus(u16),
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One JSON `POST` to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRequest {
    pub url: String,
    pub customer_key: String,
    pub user_agent: String,
    pub body: String,
}

impl PostRequest {
    /// The fixed header set sent with every request.
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            ("Content-Type", "application/json"),
            ("X-CustomerGUID", self.customer_key.as_str()),
            ("User-Agent", self.user_agent.as_str()),
        ]
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// HttpTransport trait
// ---------------------------------------------------------------------------

/// Sends a single request. Implementations must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn post(&self, request: PostRequest) -> Result<HttpResponse, TransportError>;
}
