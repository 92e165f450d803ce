//! Identity Provider Factory
//!
//! Builds provider clients from configured settings, selected by name.

use std::collections::BTreeMap;

use reqwest::Client;

pub use crate::application::config::ProviderSettings;
use crate::application::config::AuthConfig;
use crate::domain::provider::{IdentityProvider, ProviderAccount, ProviderError, ProviderFactory};
use crate::error::{AuthError, AuthResult};
use crate::infra::supabase::SupabaseProvider;

/// Any configured provider backend
#[derive(Debug, Clone)]
pub enum AnyProvider {
    Supabase(SupabaseProvider),
}

impl IdentityProvider for AnyProvider {
    fn provider_name(&self) -> &str {
        match self {
            AnyProvider::Supabase(p) => p.provider_name(),
        }
    }

    async fn register_user(&self, email: &str, password: &str) -> Result<String, ProviderError> {
        match self {
            AnyProvider::Supabase(p) => p.register_user(email, password).await,
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ProviderError> {
        match self {
            AnyProvider::Supabase(p) => p.login(email, password).await,
        }
    }

    async fn validate_token(&self, token: &str) -> Result<ProviderAccount, ProviderError> {
        match self {
            AnyProvider::Supabase(p) => p.validate_token(token).await,
        }
    }

    async fn delete_user(&self, external_id: &str) -> Result<(), ProviderError> {
        match self {
            AnyProvider::Supabase(p) => p.delete_user(external_id).await,
        }
    }
}

/// Provider factory over a settings map
#[derive(Debug, Clone)]
pub struct ConfiguredProviderFactory {
    settings: BTreeMap<String, ProviderSettings>,
    default_provider: String,
    client: Client,
}

impl ConfiguredProviderFactory {
    pub fn new(
        settings: BTreeMap<String, ProviderSettings>,
        default_provider: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            settings,
            default_provider: default_provider.into(),
            client,
        }
    }

    pub fn from_config(config: &AuthConfig, client: Client) -> Self {
        Self::new(config.providers.clone(), config.default_provider.clone(), client)
    }

    /// Create the default provider
    pub fn create_default(&self) -> AuthResult<AnyProvider> {
        self.create_provider(&self.default_provider)
    }
}

fn require(value: &str, what: &str, provider: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::UnsupportedProvider(format!(
            "{} is required for {} provider",
            what, provider
        )));
    }
    Ok(())
}

impl ProviderFactory for ConfiguredProviderFactory {
    type Provider = AnyProvider;

    fn create_provider(&self, name: &str) -> AuthResult<AnyProvider> {
        let settings = self.settings.get(name).ok_or_else(|| {
            AuthError::UnsupportedProvider(format!("no configuration found for provider: {}", name))
        })?;

        if settings.kind() != name {
            return Err(AuthError::UnsupportedProvider(format!(
                "provider {} is configured with {} settings",
                name,
                settings.kind()
            )));
        }

        match settings {
            ProviderSettings::Supabase { url, api_key } => {
                require(url, "url", name)?;
                require(api_key, "api key", name)?;
                Ok(AnyProvider::Supabase(SupabaseProvider::new(
                    self.client.clone(),
                    url.clone(),
                    api_key.clone(),
                )))
            }
        }
    }

    fn supported_providers(&self) -> Vec<String> {
        self.settings.keys().cloned().collect()
    }

    fn default_provider(&self) -> &str {
        &self.default_provider
    }
}
