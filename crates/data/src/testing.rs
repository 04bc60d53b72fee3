//! Canned JSON source for tests.

use crate::error::DataError;
use crate::http::JsonSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16),
}

/// Answers requests from a list of `(url fragment, reply)` routes.
///
/// The first route whose fragment occurs in the URL wins; unmatched URLs
/// answer 404. Every request is recorded.
#[derive(Debug, Default)]
pub struct FixtureSource {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<String>>,
}

impl FixtureSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for URLs containing `fragment`.
    #[must_use]
    pub fn with_json(mut self, fragment: impl Into<String>, body: Value) -> Self {
        self.routes.push((fragment.into(), Reply::Json(body)));
        self
    }

    /// Fails URLs containing `fragment` with HTTP `status`.
    #[must_use]
    pub fn with_status(mut self, fragment: impl Into<String>, status: u16) -> Self {
        self.routes.push((fragment.into(), Reply::Status(status)));
        self
    }

    /// URLs requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Number of requested URLs containing `fragment`.
    pub async fn calls_matching(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl JsonSource for FixtureSource {
    async fn get_json(&self, url: &str) -> Result<Value, DataError> {
        self.requests.lock().await.push(url.to_string());

        let reply = self
            .routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or(Reply::Status(404));

        match reply {
            Reply::Json(body) => Ok(body),
            Reply::Status(code) => Err(DataError::Http {
                status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                url: url.to_string(),
            }),
        }
    }
}
