//! Third-party identity sign-in.

pub mod google;
pub mod sdk;

pub use google::{GoogleSignIn, InitOutcome, SignInError, SignInState};
pub use sdk::{
    ButtonOptions, CredentialHandler, CredentialResponse, IdentityConfig, IdentitySdk, PromptOutcome,
};
