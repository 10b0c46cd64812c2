//! Authenticated request gateway.
//!
//! Every backend call in the crate goes through [`Gateway`]. It owns three
//! global policies:
//!
//! 1. the stored credential is attached as a bearer header when present,
//! 2. a 401 answer clears the stored credential before the caller sees it,
//! 3. each request is bounded by the configured timeout.
//!
//! It also owns the one place where the two list shapes the backend uses
//! (bare array or `{ "items": [...] }`) are folded into a `Vec`.

use crate::config::ApiConfig;
use crate::domain::{CredentialStorePtr, MetricsPtr};
use crate::ApiError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// ---

/// Either list shape returned by collection endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped { items: Vec<T> },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) | ListPayload::Wrapped { items } => items,
        }
    }
}

/// Decode a list body in either shape.
///
/// # Errors
/// Returns [`ApiError::Decode`] when the body is neither shape.
pub fn normalize_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, ApiError> {
    // ---
    serde_json::from_slice::<ListPayload<T>>(body)
        .map(ListPayload::into_vec)
        .map_err(|err| ApiError::Decode(format!("expected a list or {{items}}: {err}")))
}

// ---

/// Single chokepoint for backend calls.
pub struct Gateway {
    client: Client,
    api_root: Url,
    timeout: Duration,
    credentials: CredentialStorePtr,
    metrics: MetricsPtr,
}

impl Gateway {
    // ---

    /// Builds a gateway for `config`.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] when the base URL does not parse
    /// or the HTTP client cannot be constructed.
    pub fn new(
        config: &ApiConfig,
        credentials: CredentialStorePtr,
        metrics: MetricsPtr,
    ) -> Result<Self, ApiError> {
        // ---
        let api_root = Url::parse(&config.api_root())
            .map_err(|err| ApiError::InvalidRequest(format!("bad base URL: {err}")))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("ecorg-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;

        tracing::debug!("Gateway targeting {}", api_root);

        Ok(Self {
            client,
            api_root,
            timeout: config.timeout,
            credentials,
            metrics,
        })
    }

    /// The credential store this gateway reads from and clears.
    pub fn credentials(&self) -> &CredentialStorePtr {
        &self.credentials
    }

    /// Absolute URL for a resource, one percent-encoded segment per element.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        // ---
        let mut url = self.api_root.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest("base URL cannot hold a path".into()))?;
            path.pop_if_empty();
            for segment in segments {
                if segment.is_empty() {
                    return Err(ApiError::InvalidRequest("empty path segment".into()));
                }
                path.push(segment);
            }
        }
        Ok(url)
    }

    // ---

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, segments)?;
        decode(self.dispatch(Method::GET, builder).await?, self.timeout).await
    }

    pub async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, segments)?.query(query);
        decode(self.dispatch(Method::GET, builder).await?, self.timeout).await
    }

    /// GET a collection, accepting either list shape.
    pub async fn get_list<T, Q>(&self, segments: &[&str], query: &Q) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, segments)?.query(query);
        let body = read_body(self.dispatch(Method::GET, builder).await?, self.timeout).await?;
        normalize_list(&body)
    }

    pub async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, segments)?.json(body);
        decode(self.dispatch(Method::POST, builder).await?, self.timeout).await
    }

    pub async fn put<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, segments)?.json(body);
        decode(self.dispatch(Method::PUT, builder).await?, self.timeout).await
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::PUT, segments)?.multipart(form);
        decode(self.dispatch(Method::PUT, builder).await?, self.timeout).await
    }

    /// DELETE a resource. Any success status counts; the body is read and
    /// ignored, so `{}`, an empty body and a plain `OK` are all accepted.
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, segments)?;
        read_body(self.dispatch(Method::DELETE, builder).await?, self.timeout)
            .await
            .map(|_| ())
    }

    // ---

    /// Builds a request and attaches the credential if one is stored.
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        // ---
        let url = self.endpoint(segments)?;
        let builder = self.client.request(method, url);

        Ok(match self.credentials.read() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        })
    }

    /// Sends a request and applies the response policies.
    async fn dispatch(
        &self,
        method: Method,
        builder: RequestBuilder,
    ) -> Result<Response, ApiError> {
        // ---
        let start = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                self.metrics.record_request(start, method.as_str(), 0);
                return Err(self.transport_error(err));
            }
        };

        let status = response.status();
        self.metrics.record_request(start, method.as_str(), status.as_u16());
        tracing::debug!("{} {} -> {}", method, response.url().path(), status.as_u16());

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Backend rejected the credential; clearing it");
            self.credentials.clear();
            self.metrics.record_auth_rejected();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = read_body(response, self.timeout).await?;
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: rejection_message(status, &body),
            });
        }

        Ok(response)
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            tracing::warn!("Request timed out after {:?}", self.timeout);
            ApiError::Timeout(self.timeout)
        } else {
            tracing::warn!("Request failed: {}", err);
            ApiError::Transport(err.to_string())
        }
    }
}

// ---

/// Reads a response body. The client timeout covers the body too.
async fn read_body(response: Response, timeout: Duration) -> Result<Vec<u8>, ApiError> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|err| {
            if err.is_timeout() {
                ApiError::Timeout(timeout)
            } else {
                ApiError::Transport(err.to_string())
            }
        })
}

async fn decode<T: DeserializeOwned>(response: Response, timeout: Duration) -> Result<T, ApiError> {
    // ---
    let body = read_body(response, timeout).await?;
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &body
    };
    serde_json::from_slice(body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Message for a rejected request: the backend's `error`/`message` field
/// when present, otherwise a compacted preview of the body.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    // ---
    const PREVIEW_CHAR_LIMIT: usize = 160;

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }

    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
