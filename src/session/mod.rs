//! Session management for the betting site
//!
//! This module owns the authentication lifecycle: password-grant login,
//! token adoption and refresh, profile and wallet retrieval, and the
//! verification token chain the login flow depends on.

pub mod manager;
pub mod verification;

pub use manager::{Credentials, Session, SessionManager};
pub use verification::{
    CommandSolverSource, SolvingServiceSource, StaticTokenSource, TokenSource,
    VerificationTokenProvider,
};
