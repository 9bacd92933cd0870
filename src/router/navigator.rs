use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};

use super::guard::{evaluate, GuardDecision};
use super::routes::{normalize_route_path, RouteTable, View, LANDING_PATH};
use crate::storage::SessionAccessor;

/// Result of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    /// Where the router actually ended up.
    pub path: String,
    /// `None` for paths missing from the route table.
    pub view: Option<View>,
    pub redirected: bool,
}

/// The navigation surface other components depend on.
#[async_trait]
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    async fn navigate(&self, path: &str) -> Navigation;
}

#[derive(Debug)]
struct Location {
    current: String,
    history: Vec<String>,
}

/// Maps paths to views and runs the guard before every navigation.
///
/// The authentication state is read from the session on each call, so a
/// login or logout takes effect on the next navigation.
pub struct Router {
    table: RouteTable,
    session: SessionAccessor,
    location: Mutex<Location>,
}

impl Router {
    pub fn new(table: RouteTable, session: SessionAccessor) -> Self {
        Self::with_location(table, session, LANDING_PATH)
    }

    pub fn with_location(table: RouteTable, session: SessionAccessor, initial: &str) -> Self {
        Router {
            table,
            session,
            location: Mutex::new(Location {
                current: initial.to_string(),
                history: vec![initial.to_string()],
            }),
        }
    }

    /// Every location visited so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }

    /// Runs the guard for `path` without moving.
    pub async fn resolve(&self, path: &str) -> Navigation {
        let authenticated = self.session.is_authenticated().await;
        let access = self.table.access_for(path);

        let (target, redirected) = match evaluate(access, authenticated) {
            GuardDecision::Proceed => (path.to_string(), false),
            GuardDecision::Redirect(target) => {
                debug!(
                    "Guard redirected '{}' to '{}' (authenticated={})",
                    path, target, authenticated
                );
                (target.to_string(), true)
            }
        };

        Navigation {
            requested: path.to_string(),
            view: self.table.resolve(&target).map(|r| r.view),
            path: target,
            redirected,
        }
    }
}

#[async_trait]
impl Navigator for Router {
    fn current_path(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    async fn navigate(&self, path: &str) -> Navigation {
        let navigation = self.resolve(path).await;

        let mut location = self.location.lock().unwrap_or_else(PoisonError::into_inner);
        location.current = navigation.path.clone();
        location.history.push(navigation.path.clone());
        drop(location);

        match navigation.view {
            Some(view) => info!("Navigated to {} ({})", normalize_route_path(&navigation.path), view),
            None => debug!("Navigated to unrouted path {}", navigation.path),
        }
        navigation
    }
}
