//! Session creation and teardown against the backend's `/api/auth` routes.

use reqwest::Response;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::auth_fetch::{AuthClient, FetchError};
use crate::models::{AuthTokenResponse, Session};
use crate::router::{HOME_PATH, LOGIN_PATH};
use crate::storage::StorageError;
use crate::utils::value::detail_message;

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REGISTER_ENDPOINT: &str = "/api/auth/register";
pub const GOOGLE_ENDPOINT: &str = "/api/auth/google";
pub const ME_ENDPOINT: &str = "/api/auth/me";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The backend refused; carries its `detail` message verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from the server: {0}")]
    MalformedResponse(String),
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Logs users in and out. Successful sign-ins persist the session before
/// navigating to the authenticated landing view.
#[derive(Clone)]
pub struct AccountClient {
    fetch: AuthClient,
}

impl AccountClient {
    pub fn new(fetch: AuthClient) -> Self {
        AccountClient { fetch }
    }

    fn url(&self, path: &str) -> String {
        self.fetch.endpoints().to_absolute_url(path)
    }

    /// Password login. The backend expects an OAuth2 password form.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        debug!("Password login for {}", email);
        let response = self
            .fetch
            .http()
            .post(self.url(LOGIN_ENDPOINT))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;
        self.establish(response, "Login failed").await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        debug!("Registering {}", email);
        let response = self
            .fetch
            .http()
            .post(self.url(REGISTER_ENDPOINT))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        self.establish(response, "Registration failed").await
    }

    /// Trades a Google identity credential for an application session.
    pub async fn exchange_google_credential(&self, credential: &str) -> Result<Session, AuthError> {
        let response = self
            .fetch
            .http()
            .post(self.url(GOOGLE_ENDPOINT))
            .json(&json!({ "credential": credential }))
            .send()
            .await?;
        self.establish(response, "Google sign-in failed").await
    }

    /// The profile of the signed-in user, through the authenticated fetch.
    pub async fn current_user(&self) -> Result<Value, AuthError> {
        let response = self.fetch.get(ME_ENDPOINT).await?;
        let status = response.status();
        let body = read_json(response).await?;
        if !status.is_success() {
            return Err(rejection(body.as_ref(), "Could not load the profile"));
        }
        body.ok_or_else(|| AuthError::MalformedResponse("empty profile body".to_string()))
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.fetch.session().clear().await?;
        self.fetch.navigator().navigate(LOGIN_PATH).await;
        Ok(())
    }

    /// Persists the session from a token response, then navigates home.
    /// Storage is left untouched on any failure.
    async fn establish(&self, response: Response, fallback: &str) -> Result<Session, AuthError> {
        let status = response.status();
        let body = read_json(response).await?;
        if !status.is_success() {
            let err = rejection(body.as_ref(), fallback);
            info!("Sign-in rejected with status {}: {}", status, err);
            return Err(err);
        }

        let body = body.ok_or_else(|| AuthError::MalformedResponse("empty body".to_string()))?;
        let token: AuthTokenResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        let session = Session::from(token);

        self.fetch.session().save(&session).await?;
        self.fetch.navigator().navigate(HOME_PATH).await;
        Ok(session)
    }
}

/// Reads the body as JSON. Non-JSON bodies read as `None`.
async fn read_json(response: Response) -> Result<Option<Value>, AuthError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes).ok())
}

fn rejection(body: Option<&Value>, fallback: &str) -> AuthError {
    let message = body
        .and_then(|b| b.get("detail"))
        .and_then(detail_message)
        .unwrap_or_else(|| fallback.to_string());
    AuthError::Rejected(message)
}
