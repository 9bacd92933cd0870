//! Shared client state.
//!
//! Everything a view needs lives here: resolved configuration, the session,
//! the router, the authenticated HTTP client and the reactive stores.

use std::sync::Arc;

use crate::client::{AccountClient, AuthClient};
use crate::config::{ApiEndpoints, ConfigV1};
use crate::oauth::{GoogleSignIn, IdentitySdk};
use crate::router::Router;
use crate::storage::SessionAccessor;
use crate::stores::{FilterStore, ToastStore};

/// Client state shared by every view. Cloning shares the underlying state.
#[derive(Clone)]
pub struct ClientState {
    /// Configuration resolved at startup.
    pub config: Arc<ConfigV1>,
    pub endpoints: Arc<ApiEndpoints>,
    pub session: SessionAccessor,
    pub router: Arc<Router>,
    /// Bearer-token fetch used for every backend call.
    pub fetch: AuthClient,
    pub account: AccountClient,
    pub toasts: ToastStore,
    /// Opportunities search state.
    pub opportunities: FilterStore,
}

impl ClientState {
    /// Binds Google sign-in to a host-provided SDK.
    pub fn google_sign_in(&self, sdk: Arc<dyn IdentitySdk>) -> GoogleSignIn {
        GoogleSignIn::new(
            sdk,
            self.config.google_client_id.clone(),
            self.account.clone(),
        )
    }
}
