//! Identity Provider Capability
//!
//! External service that owns credentials. The local account store only
//! records the identifier it hands back.

use thiserror::Error;

/// Failure reported by an identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered and said no (bad password, taken email, unknown user)
    #[error("rejected by provider: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered 5xx
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something we could not read
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("operation not supported by provider: {0}")]
    Unsupported(String),
}

/// Identity as the provider reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAccount {
    pub id: String,
    pub email: String,
}

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Stable name recorded on accounts, e.g. `supabase`
    fn provider_name(&self) -> &str;

    /// Create the identity upstream, returning its external id
    async fn register_user(&self, email: &str, password: &str) -> Result<String, ProviderError>;

    /// Verify credentials, returning an external identifier or opaque proof
    async fn login(&self, email: &str, password: &str) -> Result<String, ProviderError>;

    /// Resolve an upstream-issued token to the identity it belongs to
    async fn validate_token(&self, token: &str) -> Result<ProviderAccount, ProviderError>;

    async fn delete_user(&self, external_id: &str) -> Result<(), ProviderError>;
}

/// Resolves configured providers by name
pub trait ProviderFactory: Send + Sync {
    type Provider: IdentityProvider + Send + Sync;

    /// Fails with `UnsupportedProvider` when the name is unknown or unconfigured
    fn create_provider(&self, name: &str) -> crate::error::AuthResult<Self::Provider>;

    fn supported_providers(&self) -> Vec<String>;

    fn default_provider(&self) -> &str;
}
