//! Path-to-view routing with authentication gating.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{evaluate, GuardDecision};
pub use navigator::{Navigation, Navigator, Router};
pub use routes::{
    is_public_path, normalize_route_path, RouteAccess, RouteRecord, RouteTable, View, HOME_PATH,
    LANDING_PATH, LOGIN_PATH, PUBLIC_PATHS, REGISTER_PATH,
};
