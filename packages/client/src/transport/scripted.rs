//! In-memory [`HttpTransport`] that replays queued replies.
//!
//! Every request is recorded, so tests can assert how many calls were made,
//! in which order, and with which bodies. Replies are consumed first-in,
//! first-out regardless of URL; a request with nothing queued fails with a
//! [`TransportError::Connection`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{HttpResponse, HttpTransport, PostRequest, TransportError};

#[derive(Default)]
struct Inner {
    replies: VecDeque<Result<HttpResponse, TransportError>>,
    requests: Vec<PostRequest>,
}

/// Scripted transport for protocol tests.
#[derive(Default)]
pub struct ScriptedTransport {
    inner: Mutex<Inner>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a `200` reply with `value` as its body.
    pub fn reply_json(&self, value: Value) -> &Self {
        self.reply(200, value.to_string())
    }

    /// Queue a reply with an arbitrary status and raw body.
    pub fn reply(&self, status: u16, body: impl Into<String>) -> &Self {
        self.lock().replies.push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
        self
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: TransportError) -> &Self {
        self.lock().replies.push_back(Err(error));
        self
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<PostRequest> {
        self.lock().requests.clone()
    }

    /// The endpoint path (`api/...`) of every request received so far.
    pub fn paths(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|r| match r.url.find("api/") {
                Some(i) => r.url[i..].to_string(),
                None => r.url.clone(),
            })
            .collect()
    }

    /// Number of replies still queued.
    pub fn pending(&self) -> usize {
        self.lock().replies.len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post(&self, request: PostRequest) -> Result<HttpResponse, TransportError> {
        let mut inner = self.lock();
        inner.requests.push(request);
        inner
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted reply".into())))
    }
}
