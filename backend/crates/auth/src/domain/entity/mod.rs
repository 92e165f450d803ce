//! Entity Module

pub mod account;
pub mod session_claims;

pub use account::{Account, AccountStats};
pub use session_claims::SessionClaims;
