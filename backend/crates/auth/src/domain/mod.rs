//! Domain Layer
//!
//! Contains entities, value objects, and the capability traits the
//! application layer is written against.

pub mod entity;
pub mod provider;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Account, AccountStats, SessionClaims};
pub use provider::{IdentityProvider, ProviderAccount, ProviderError, ProviderFactory};
pub use repository::AccountRepository;
pub use value_object::{AccountId, Email, Role};
