//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, capability traits (store, identity provider)
//! - `application/` - Use cases and application services
//! - `infra/` - Session tokens, PostgreSQL store, identity provider clients
//! - `presentation/` - HTTP handlers, DTOs, access-control middleware, routers
//!
//! ## Features
//! - Register / login against an external identity provider (Supabase)
//! - Local account records reconciled on first login
//! - Stateless HS256 session tokens with refresh near expiry
//! - Role gates (`user` < `admin` < `super_admin`) for API and browser routes
//! - Admin account management
//!
//! ## Security Model
//! - Passwords never reach the local store; the provider owns credentials
//! - Login failures carry no detail about which part failed
//! - Tokens are verified with zero leeway and a fixed HMAC algorithm

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use application::config::{AuthConfig, ProviderSettings};
pub use error::{AuthError, AuthResult};
pub use infra::jwt::TokenService;
pub use infra::postgres::PgAccountRepository;
pub use infra::provider_factory::{AnyProvider, ConfiguredProviderFactory};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
