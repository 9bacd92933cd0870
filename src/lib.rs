//! Library exports for the ascent client, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod models;
pub mod oauth;
pub mod router;
pub mod startup;
pub mod state;
pub mod storage;
pub mod stores;
pub mod utils;
