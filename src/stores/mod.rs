//! Process-wide reactive state containers, passed by reference to the views
//! that observe them.

pub mod filter_store;
pub mod toast_store;

pub use filter_store::FilterStore;
pub use toast_store::{ToastStore, DEFAULT_TOAST_DURATION};
