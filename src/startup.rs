//! Client initialization.
//!
//! Wires the session storage, the router and the HTTP client together from
//! a resolved configuration.

use std::sync::Arc;
use tracing::info;

use crate::client::{AccountClient, AuthClient};
use crate::config::{ApiEndpoints, ConfigV1};
use crate::router::{RouteTable, Router};
use crate::state::ClientState;
use crate::storage::{create_storage, KeyValueStorage, SessionAccessor};
use crate::stores::{FilterStore, ToastStore};

/// Builds the client state with the storage backend named in the configuration.
pub fn build_state(config: ConfigV1) -> ClientState {
    let storage = create_storage(&config.storage);
    build_state_with_storage(config, storage)
}

/// Builds the client state on top of an existing storage backend.
pub fn build_state_with_storage(
    config: ConfigV1,
    storage: Arc<dyn KeyValueStorage>,
) -> ClientState {
    let config = Arc::new(config);
    let endpoints = Arc::new(ApiEndpoints::from_config(&config));
    info!("Using API base URL {}", endpoints.base_url());

    let session = SessionAccessor::new(storage);
    let router = Arc::new(Router::new(RouteTable::default(), session.clone()));
    let fetch = AuthClient::new(
        reqwest::Client::new(),
        endpoints.clone(),
        session.clone(),
        router.clone(),
    );
    let account = AccountClient::new(fetch.clone());

    ClientState {
        config,
        endpoints,
        session,
        router,
        fetch,
        account,
        toasts: ToastStore::new(),
        opportunities: FilterStore::new(),
    }
}
