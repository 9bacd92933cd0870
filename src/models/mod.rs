pub mod filters;
pub mod session;
pub mod toast;

pub use filters::OpportunityFilters;
pub use session::{AuthTokenResponse, Session};
pub use toast::{Toast, ToastKind};
