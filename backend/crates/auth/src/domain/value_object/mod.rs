//! Value Object Module

pub mod email;
pub mod role;

pub use email::Email;
pub use kernel::id::AccountId;
pub use role::Role;
