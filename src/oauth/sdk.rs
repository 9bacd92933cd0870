//! The surface of the Google Identity Services SDK this crate consumes.
//!
//! The SDK loads on its own schedule and lives outside this crate; hosts
//! provide an implementation (a browser binding, a desktop webview bridge,
//! or a test double).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// The identity-received callback handed to the SDK. The SDK calls
/// [`CredentialHandler::deliver`] once per completed button interaction.
#[derive(Debug, Clone)]
pub struct CredentialHandler {
    sender: UnboundedSender<CredentialResponse>,
}

impl CredentialHandler {
    pub fn new(sender: UnboundedSender<CredentialResponse>) -> Self {
        CredentialHandler { sender }
    }

    /// Returns false once the sign-in adapter behind it is gone.
    pub fn deliver(&self, response: CredentialResponse) -> bool {
        self.sender.send(response).is_ok()
    }
}

/// Arguments to the SDK's `initialize` call.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub client_id: String,
    pub auto_select: bool,
    pub callback: CredentialHandler,
}

/// Appearance of the rendered sign-in button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonOptions {
    pub theme: String,
    pub size: String,
    pub shape: String,
    pub width: u32,
    pub locale: String,
    pub text: String,
    pub logo_alignment: String,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        ButtonOptions {
            theme: "outline".to_string(),
            size: "large".to_string(),
            shape: "pill".to_string(),
            width: 240,
            locale: "fr".to_string(),
            text: "signin_with".to_string(),
            logo_alignment: "left".to_string(),
        }
    }
}

/// The signed identity token handed over after the user authenticates with Google.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialResponse {
    pub credential: String,
    #[serde(default)]
    pub select_by: Option<String>,
}

/// How a one-shot prompt ended. Carries the credential at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Credential(CredentialResponse),
    /// The prompt could not be shown; the SDK's reason code.
    NotDisplayed(String),
    Skipped(String),
    Dismissed(String),
}

impl PromptOutcome {
    pub fn is_not_displayed(&self) -> bool {
        matches!(self, PromptOutcome::NotDisplayed(_))
    }

    pub fn is_skipped_moment(&self) -> bool {
        matches!(self, PromptOutcome::Skipped(_))
    }

    pub fn is_dismissed_moment(&self) -> bool {
        matches!(self, PromptOutcome::Dismissed(_))
    }
}

#[async_trait]
pub trait IdentitySdk: Send + Sync {
    /// Whether the externally loaded SDK is available yet.
    fn is_loaded(&self) -> bool;

    fn initialize(&self, config: IdentityConfig);

    /// Whether the named insertion point exists in the host UI.
    fn has_element(&self, element_id: &str) -> bool;

    fn render_button(&self, element_id: &str, options: &ButtonOptions);

    /// Shows the one-tap prompt and resolves once it ends.
    async fn prompt(&self) -> PromptOutcome;
}
