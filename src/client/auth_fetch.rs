//! Outbound HTTP with bearer-token injection and 401 session teardown.
//!
//! No retry and no timeout. Transport failures propagate to the caller; any
//! response, 401 included, is handed back untouched for the caller to read.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::ApiEndpoints;
use crate::router::{is_public_path, Navigator, LOGIN_PATH};
use crate::storage::{SessionAccessor, StorageError};
use crate::utils::log_throttle::LogThrottle;

const UNAUTHORIZED_LOG_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Request payload. Binary and multipart bodies leave the content type to the transport.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Multipart(Form),
}

impl RequestBody {
    fn wants_json_content_type(&self) -> bool {
        !matches!(self, RequestBody::Bytes(_) | RequestBody::Multipart(_))
    }
}

#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        RequestOptions {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Wraps every backend call with the stored bearer token.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    endpoints: Arc<ApiEndpoints>,
    session: SessionAccessor,
    navigator: Arc<dyn Navigator>,
    unauthorized_log: Arc<LogThrottle>,
}

impl AuthClient {
    pub fn new(
        http: reqwest::Client,
        endpoints: Arc<ApiEndpoints>,
        session: SessionAccessor,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        AuthClient {
            http,
            endpoints,
            session,
            navigator,
            unauthorized_log: Arc::new(LogThrottle::new(UNAUTHORIZED_LOG_WINDOW)),
        }
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &SessionAccessor {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// The bare HTTP client, for calls that must not carry the session.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn fetch(&self, path: &str, options: RequestOptions) -> Result<Response, FetchError> {
        let url = self.endpoints.to_absolute_url(path);
        let RequestOptions {
            method,
            mut headers,
            body,
        } = options;

        if let Some(token) = self.session.token().await? {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        if body.wants_json_content_type() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        debug!("{} {}", method, url);
        let request = self.http.request(method, &url).headers(headers);
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.body(serde_json::to_vec(&value)?),
            RequestBody::Text(text) => request.body(text),
            RequestBody::Bytes(bytes) => request.body(bytes),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(response.url().path()).await;
        }
        Ok(response)
    }

    pub async fn get(&self, path: &str) -> Result<Response, FetchError> {
        self.fetch(path, RequestOptions::get()).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, FetchError> {
        let body = RequestBody::Json(serde_json::to_value(payload)?);
        self.fetch(path, RequestOptions::post().body(body)).await
    }

    /// WebSocket URL for `path`, carrying the token as a `token` query parameter
    /// when a session exists.
    pub async fn websocket_url(&self, path: &str) -> Result<String, FetchError> {
        let ws_url = self.endpoints.to_websocket_url(path);
        let Some(token) = self.session.token().await? else {
            return Ok(ws_url);
        };
        match Url::parse(&ws_url) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("token", &token);
                Ok(url.to_string())
            }
            // malformed input is passed through
            Err(_) => Ok(ws_url),
        }
    }

    async fn handle_unauthorized(&self, path: &str) {
        if let Some(dropped) = self.unauthorized_log.admit(path) {
            warn!(
                "Backend rejected the session for {} ({} more since last report)",
                path, dropped
            );
        }
        if let Err(e) = self.session.clear().await {
            error!("Failed to clear session after 401: {}", e);
        }

        let current = self.navigator.current_path();
        if is_public_path(&current) {
            debug!("Already on public path {}, not redirecting", current);
            return;
        }
        self.navigator.navigate(LOGIN_PATH).await;
    }
}
