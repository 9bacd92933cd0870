//! Google sign-in: waits for the identity SDK, wires it to this client and
//! exchanges the credential it hands back for an application session.
//!
//! Overlapping prompts and exchanges are not deduplicated; two credentials
//! arriving together race and the last session written wins.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::sdk::{
    ButtonOptions, CredentialHandler, CredentialResponse, IdentityConfig, IdentitySdk, PromptOutcome,
};
use crate::client::{AccountClient, AuthError};
use crate::models::Session;

/// How often SDK availability is checked.
pub const SDK_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Polling stops after this long whether or not the SDK showed up.
pub const SDK_POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown when the one-tap prompt cannot be used.
pub const PROMPT_FALLBACK_MESSAGE: &str = "Use the \"Continue with Google\" button below.";

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Google SDK not loaded. Refresh the page.")]
    SdkUnavailable,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// What the view renders: a spinner flag and the last user-facing error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInState {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// No client id configured; the feature is off.
    Disabled,
    Ready,
    /// The SDK never loaded within [`SDK_POLL_TIMEOUT`].
    TimedOut,
}

/// Cloning shares the adapter and its state channel.
#[derive(Clone)]
pub struct GoogleSignIn {
    sdk: Arc<dyn IdentitySdk>,
    client_id: Option<String>,
    exchange: Arc<CredentialExchange>,
}

/// The part of the adapter the SDK callback reaches. Holds no reference to
/// the SDK, so dropping the SDK ends the callback task.
struct CredentialExchange {
    account: AccountClient,
    state: watch::Sender<SignInState>,
}

impl CredentialExchange {
    async fn run(&self, credential: &str) -> Result<Session, AuthError> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.account.exchange_google_credential(credential).await;

        self.state.send_modify(|s| {
            s.loading = false;
            s.error = result.as_ref().err().map(ToString::to_string);
        });
        if let Err(e) = &result {
            warn!("Google credential exchange failed: {}", e);
        }
        result
    }
}

async fn receive_credentials(
    exchange: Arc<CredentialExchange>,
    mut receiver: mpsc::UnboundedReceiver<CredentialResponse>,
) {
    while let Some(response) = receiver.recv().await {
        debug!("Credential received from the sign-in button.");
        // failures are published on the state channel
        let _ = exchange.run(&response.credential).await;
    }
    debug!("Google SDK released the credential callback.");
}

impl GoogleSignIn {
    pub fn new(sdk: Arc<dyn IdentitySdk>, client_id: Option<String>, account: AccountClient) -> Self {
        let (state, _) = watch::channel(SignInState::default());
        GoogleSignIn {
            sdk,
            client_id: client_id.filter(|id| !id.trim().is_empty()),
            exchange: Arc::new(CredentialExchange { account, state }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client_id.is_some()
    }

    pub fn state(&self) -> SignInState {
        self.exchange.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SignInState> {
        self.exchange.state.subscribe()
    }

    /// Waits for the SDK, configures it with the client id and the
    /// identity-received callback, and optionally renders the sign-in
    /// button into `element_id`.
    ///
    /// Credentials the SDK delivers through the callback are exchanged on a
    /// background task that ends when the SDK drops the callback.
    pub async fn initialize(&self, element_id: Option<&str>) -> InitOutcome {
        let Some(client_id) = self.client_id.clone() else {
            debug!("No Google client id configured; Google sign-in disabled.");
            return InitOutcome::Disabled;
        };

        if timeout(SDK_POLL_TIMEOUT, wait_for_sdk(self.sdk.as_ref()))
            .await
            .is_err()
        {
            warn!(
                "Google SDK did not load within {}s; giving up.",
                SDK_POLL_TIMEOUT.as_secs()
            );
            return InitOutcome::TimedOut;
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(receive_credentials(self.exchange.clone(), receiver));
        self.sdk.initialize(IdentityConfig {
            client_id,
            auto_select: false,
            callback: CredentialHandler::new(sender),
        });
        info!("Google SDK initialized.");

        if let Some(element_id) = element_id {
            if self.sdk.has_element(element_id) {
                self.sdk.render_button(element_id, &ButtonOptions::default());
            } else {
                debug!("Sign-in insertion point '{}' not found.", element_id);
            }
        }
        InitOutcome::Ready
    }

    /// Shows the one-tap prompt. Returns the new session when the prompt
    /// produced a credential, `None` when it was skipped or dismissed.
    pub async fn trigger_prompt(&self) -> Result<Option<Session>, SignInError> {
        let state = &self.exchange.state;
        if !self.sdk.is_loaded() {
            let err = SignInError::SdkUnavailable;
            state.send_modify(|s| s.error = Some(err.to_string()));
            return Err(err);
        }

        state.send_modify(|s| {
            s.error = None;
            s.loading = true;
        });

        let outcome = match self.sdk.prompt().await {
            PromptOutcome::Credential(response) => {
                return Ok(Some(self.exchange.run(&response.credential).await?));
            }
            other => other,
        };

        if outcome.is_not_displayed() {
            info!("One-tap prompt could not be displayed: {:?}", outcome);
        } else if outcome.is_skipped_moment() {
            debug!("One-tap prompt skipped: {:?}", outcome);
        } else if outcome.is_dismissed_moment() {
            debug!("One-tap prompt dismissed: {:?}", outcome);
        }
        state.send_modify(|s| {
            s.loading = false;
            s.error = Some(PROMPT_FALLBACK_MESSAGE.to_string());
        });
        Ok(None)
    }

    /// Exchanges a credential the host received some other way.
    ///
    /// On failure the error is published and any existing session is left as is.
    pub async fn handle_credential(&self, credential: &str) -> Result<Session, AuthError> {
        self.exchange.run(credential).await
    }
}

async fn wait_for_sdk(sdk: &dyn IdentitySdk) {
    let mut ticker = interval_at(Instant::now() + SDK_POLL_INTERVAL, SDK_POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if sdk.is_loaded() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AuthClient;
    use crate::config::ApiEndpoints;
    use crate::router::{Navigator, RouteTable, Router, HOME_PATH, LOGIN_PATH};
    use crate::storage::memory_storage::MemoryStorage;
    use crate::storage::SessionAccessor;
    use async_trait::async_trait;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSdk {
        loaded: AtomicBool,
        elements: Vec<String>,
        initialized: Mutex<Option<IdentityConfig>>,
        rendered: Mutex<Vec<(String, ButtonOptions)>>,
        outcomes: Mutex<VecDeque<PromptOutcome>>,
        prompts: AtomicUsize,
    }

    impl FakeSdk {
        fn loaded() -> Self {
            let sdk = FakeSdk::default();
            sdk.loaded.store(true, Ordering::SeqCst);
            sdk
        }

        fn with_outcome(self, outcome: PromptOutcome) -> Self {
            self.outcomes.lock().unwrap().push_back(outcome);
            self
        }

        /// What the real SDK does when the user finishes the button flow.
        fn press_button(&self, credential: &str) -> bool {
            let callback = self
                .initialized
                .lock()
                .unwrap()
                .as_ref()
                .expect("sdk initialized")
                .callback
                .clone();
            callback.deliver(CredentialResponse {
                credential: credential.to_string(),
                select_by: Some("btn".to_string()),
            })
        }
    }

    #[async_trait]
    impl IdentitySdk for FakeSdk {
        fn is_loaded(&self) -> bool {
            self.loaded.load(Ordering::SeqCst)
        }

        fn initialize(&self, config: IdentityConfig) {
            *self.initialized.lock().unwrap() = Some(config);
        }

        fn has_element(&self, element_id: &str) -> bool {
            self.elements.iter().any(|e| e == element_id)
        }

        fn render_button(&self, element_id: &str, options: &ButtonOptions) {
            self.rendered
                .lock()
                .unwrap()
                .push((element_id.to_string(), options.clone()));
        }

        async fn prompt(&self) -> PromptOutcome {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| PromptOutcome::Dismissed("credential_returned".to_string()))
        }
    }

    struct Harness {
        google: GoogleSignIn,
        sdk: Arc<FakeSdk>,
        session: SessionAccessor,
        router: Arc<Router>,
    }

    fn harness(sdk: FakeSdk, client_id: Option<&str>, base_url: &str) -> Harness {
        let sdk = Arc::new(sdk);
        let session = SessionAccessor::new(Arc::new(MemoryStorage::new()));
        let router = Arc::new(Router::with_location(
            RouteTable::default(),
            session.clone(),
            LOGIN_PATH,
        ));
        let fetch = AuthClient::new(
            reqwest::Client::new(),
            Arc::new(ApiEndpoints::new(base_url)),
            session.clone(),
            router.clone(),
        );
        let google = GoogleSignIn::new(
            sdk.clone(),
            client_id.map(str::to_string),
            AccountClient::new(fetch),
        );
        Harness {
            google,
            sdk,
            session,
            router,
        }
    }

    const CLIENT_ID: &str = "1234-abc.apps.googleusercontent.com";

    #[tokio::test]
    async fn test_missing_client_id_disables_silently() {
        for client_id in [None, Some(""), Some("   ")] {
            let h = harness(FakeSdk::loaded(), client_id, "http://127.0.0.1:9");
            assert!(!h.google.is_enabled());
            assert_eq!(h.google.initialize(Some("google-btn")).await, InitOutcome::Disabled);
            assert!(h.sdk.initialized.lock().unwrap().is_none());
            assert_eq!(h.google.state(), SignInState::default());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_renders_button_when_element_exists() {
        let sdk = FakeSdk {
            elements: vec!["google-btn".to_string()],
            ..FakeSdk::loaded()
        };
        let h = harness(sdk, Some(CLIENT_ID), "http://127.0.0.1:9");

        assert_eq!(h.google.initialize(Some("google-btn")).await, InitOutcome::Ready);
        {
            let initialized = h.sdk.initialized.lock().unwrap();
            let config = initialized.as_ref().expect("sdk initialized");
            assert_eq!(config.client_id, CLIENT_ID);
            assert!(!config.auto_select);
        }
        let rendered = h.sdk.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].0, "google-btn");
        assert_eq!(rendered[0].1.width, 240);
        assert_eq!(rendered[0].1.shape, "pill");
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_skips_missing_element() {
        let h = harness(FakeSdk::loaded(), Some(CLIENT_ID), "http://127.0.0.1:9");
        assert_eq!(h.google.initialize(Some("absent")).await, InitOutcome::Ready);
        assert!(h.sdk.initialized.lock().unwrap().is_some());
        assert!(h.sdk.rendered.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_polls_until_sdk_loads() {
        let h = harness(FakeSdk::default(), Some(CLIENT_ID), "http://127.0.0.1:9");
        let sdk = h.sdk.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            sdk.loaded.store(true, Ordering::SeqCst);
        });

        let start = Instant::now();
        assert_eq!(h.google.initialize(None).await, InitOutcome::Ready);
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_gives_up_after_timeout() {
        let h = harness(FakeSdk::default(), Some(CLIENT_ID), "http://127.0.0.1:9");

        let start = Instant::now();
        assert_eq!(h.google.initialize(Some("google-btn")).await, InitOutcome::TimedOut);
        assert_eq!(start.elapsed(), SDK_POLL_TIMEOUT);
        assert!(h.sdk.initialized.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prompt_without_sdk_reports_error() {
        let h = harness(FakeSdk::default(), Some(CLIENT_ID), "http://127.0.0.1:9");

        let err = h.google.trigger_prompt().await.unwrap_err();
        assert!(matches!(err, SignInError::SdkUnavailable));
        assert_eq!(h.sdk.prompts.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.google.state(),
            SignInState {
                loading: false,
                error: Some("Google SDK not loaded. Refresh the page.".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_skipped_prompt_is_a_correctable_error() {
        for outcome in [
            PromptOutcome::NotDisplayed("opt_out_or_no_session".to_string()),
            PromptOutcome::Skipped("user_cancel".to_string()),
            PromptOutcome::Dismissed("cancel_called".to_string()),
        ] {
            let sdk = FakeSdk::loaded().with_outcome(outcome);
            let h = harness(sdk, Some(CLIENT_ID), "http://127.0.0.1:9");

            assert_eq!(h.google.trigger_prompt().await.unwrap(), None);
            assert_eq!(
                h.google.state(),
                SignInState {
                    loading: false,
                    error: Some(PROMPT_FALLBACK_MESSAGE.to_string()),
                }
            );
        }
    }

    #[tokio::test]
    async fn test_prompt_credential_is_exchanged() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/auth/google")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"credential": "id-token"})))
            .with_status(200)
            .with_body(r#"{"access_token":"abc","user":{"id":1}}"#)
            .create_async()
            .await;

        let sdk = FakeSdk::loaded().with_outcome(PromptOutcome::Credential(CredentialResponse {
            credential: "id-token".to_string(),
            select_by: Some("user".to_string()),
        }));
        let h = harness(sdk, Some(CLIENT_ID), &server.url());

        let session = h.google.trigger_prompt().await.unwrap().expect("session");
        m.assert_async().await;

        assert_eq!(session.token, "abc");
        assert_eq!(h.session.token().await.unwrap().as_deref(), Some("abc"));
        assert_eq!(h.session.user().await.unwrap(), Some(json!({"id": 1})));
        assert_eq!(h.router.current_path(), HOME_PATH);
        assert_eq!(h.google.state(), SignInState::default());
    }

    #[tokio::test]
    async fn test_button_credential_goes_through_registered_callback() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/auth/google")
            .match_body(Matcher::Json(json!({"credential": "button-token"})))
            .with_status(200)
            .with_body(r#"{"access_token":"abc","user":{"id":1}}"#)
            .create_async()
            .await;

        let sdk = FakeSdk {
            elements: vec!["google-btn".to_string()],
            ..FakeSdk::loaded()
        };
        let h = harness(sdk, Some(CLIENT_ID), &server.url());
        assert_eq!(h.google.initialize(Some("google-btn")).await, InitOutcome::Ready);
        assert_eq!(h.sdk.rendered.lock().unwrap().len(), 1);

        assert!(h.sdk.press_button("button-token"));
        timeout(Duration::from_secs(5), async {
            while h.router.current_path() != HOME_PATH {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("navigated to the dashboard");

        m.assert_async().await;
        assert_eq!(h.session.token().await.unwrap().as_deref(), Some("abc"));
        assert_eq!(h.sdk.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_reports_closed_once_adapter_task_is_gone() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handler = CredentialHandler::new(sender);
        drop(receiver);
        assert!(!handler.deliver(CredentialResponse {
            credential: "late".to_string(),
            select_by: None,
        }));
    }

    #[tokio::test]
    async fn test_rejected_credential_keeps_existing_session() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/auth/google")
            .with_status(400)
            .with_body(r#"{"detail":"bad credential"}"#)
            .create_async()
            .await;

        let h = harness(FakeSdk::loaded(), Some(CLIENT_ID), &server.url());
        h.session
            .save(&Session::new("previous", json!({"id": 0})))
            .await
            .unwrap();

        let err = h.google.handle_credential("forged").await.unwrap_err();
        assert_eq!(err.to_string(), "bad credential");
        assert_eq!(h.google.state().error.as_deref(), Some("bad credential"));
        assert!(!h.google.state().loading);
        assert_eq!(h.session.token().await.unwrap().as_deref(), Some("previous"));
        assert_eq!(h.router.current_path(), LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_network_failure_is_surfaced() {
        let h = harness(FakeSdk::loaded(), Some(CLIENT_ID), "http://127.0.0.1:9");

        let err = h.google.handle_credential("id-token").await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert!(h.google.state().error.is_some());
        assert!(!h.session.is_authenticated().await);
    }
}
