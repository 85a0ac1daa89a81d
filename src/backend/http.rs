//! HTTP implementation of [`RecordBackend`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

use super::{BackendError, RecordBackend};
use crate::domain::normalize::collection_items;
use crate::domain::{CanonicalStatus, RecordKind};

/// Body of `POST {path}/{id}/status`.
#[derive(Debug, Serialize)]
struct TransitionBody<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Platform API client.
///
/// Paths are resolved as `{base_url}/{kind path}[/{id}[/status]]`, one
/// percent-encoded segment per id, so an id can never leave its
/// collection. When an API token is configured it is sent as a bearer
/// token on every call.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpBackend {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidUrl`] for a base URL that cannot
    /// carry a path and [`BackendError::Transport`] if the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| BackendError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(raw));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_token,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn collection_url(&self, kind: RecordKind) -> Result<Url, BackendError> {
        self.endpoint(kind, &[])
    }

    fn record_url(&self, kind: RecordKind, id: &str) -> Result<Url, BackendError> {
        self.endpoint(kind, &[id])
    }

    /// Appends the kind's path and `segments` to the base URL. Empty and
    /// dot-only segments name no record.
    fn endpoint(&self, kind: RecordKind, segments: &[&str]) -> Result<Url, BackendError> {
        if segments
            .iter()
            .any(|s| s.is_empty() || s.chars().all(|c| c == '.'))
        {
            return Err(BackendError::NotFound);
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(kind.backend_path().split('/'))
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

#[async_trait]
impl RecordBackend for HttpBackend {
    async fn fetch_collection(&self, kind: RecordKind) -> Result<Vec<Value>, BackendError> {
        let url = self.collection_url(kind)?;
        let response = self.send(self.client.get(url)).await?;
        let payload = read_json(response).await?;
        let items = collection_items(payload);
        tracing::debug!(%kind, count = items.len(), "fetched collection");
        Ok(items)
    }

    async fn fetch_record(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        let url = match self.record_url(kind, id) {
            Ok(url) => url,
            Err(BackendError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        let response = self.send(self.client.get(url)).await?;
        match read_json(response).await {
            Ok(payload) => Ok(Some(unwrap_record(payload))),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn transition_status(
        &self,
        kind: RecordKind,
        id: &str,
        target: &CanonicalStatus,
        reason: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(kind, &[id, "status"])?;
        let body = TransitionBody {
            status: target.as_str(),
            reason,
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, &text))
    }
}

/// Reads a successful response as JSON, mapping error statuses.
async fn read_json(response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;
    if !status.is_success() {
        return Err(status_error(status, &text));
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Single-record endpoints sometimes wrap the object under `data`.
fn unwrap_record(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = extract_message(body)
        .unwrap_or_else(|| format!("the backend rejected the request (HTTP {})", status.as_u16()));
    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            BackendError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
        _ => BackendError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Understands `{"message"}`, `{"error": "..."}`, `{"error": {"message"}}`
/// and `{"detail"}`; short plain-text bodies are used as-is.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return (body.len() <= 200 && !body.starts_with('<')).then(|| body.to_string());
    };
    ["/message", "/error/message", "/error", "/detail"]
        .iter()
        .filter_map(|pointer| json.pointer(pointer))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
