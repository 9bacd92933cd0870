//! The navigation guard.
//!
//! Total by construction: every (access, authenticated) pair resolves to
//! either the requested route or a redirect, and redirect targets never
//! redirect again.

use super::routes::{RouteAccess, HOME_PATH, LOGIN_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

pub fn evaluate(access: RouteAccess, authenticated: bool) -> GuardDecision {
    match (access, authenticated) {
        (RouteAccess::Protected, false) => GuardDecision::Redirect(LOGIN_PATH),
        (RouteAccess::PublicOnly, true) => GuardDecision::Redirect(HOME_PATH),
        _ => GuardDecision::Proceed,
    }
}
