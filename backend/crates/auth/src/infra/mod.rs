//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod jwt;
pub mod postgres;
pub mod provider_factory;
pub mod supabase;

pub use jwt::TokenService;
pub use postgres::PgAccountRepository;
pub use provider_factory::{AnyProvider, ConfiguredProviderFactory};
pub use supabase::SupabaseProvider;
