//! Backend access: the authenticated fetch wrapper and the account calls built on it.

pub mod account;
pub mod auth_fetch;

pub use account::{AccountClient, AuthError};
pub use auth_fetch::{AuthClient, FetchError, RequestBody, RequestOptions};
