//! Login Use Case
//!
//! Verifies credentials upstream, reconciles the local account and issues a
//! session token.

use std::sync::Arc;

use crate::application::register::AuthOutput;
use crate::domain::entity::Account;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{Email, Role};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenService;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<S, P>
where
    S: AccountRepository,
    P: IdentityProvider,
{
    store: Arc<S>,
    provider: Arc<P>,
    tokens: Arc<TokenService>,
}

impl<S, P> LoginUseCase<S, P>
where
    S: AccountRepository,
    P: IdentityProvider,
{
    pub fn new(store: Arc<S>, provider: Arc<P>, tokens: Arc<TokenService>) -> Self {
        Self {
            store,
            provider,
            tokens,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<AuthOutput> {
        let email = Email::new(input.email)?;

        let provider_id = match self.provider.login(email.as_str(), &input.password).await {
            Ok(id) => id,
            Err(err) => {
                tracing::debug!(error = %err, "Upstream login rejected");
                return Err(AuthError::AuthenticationFailed);
            }
        };

        let account = self.reconcile(email, provider_id).await?;

        let token = self
            .tokens
            .generate_token(&account.id.to_string(), account.email.as_str(), account.role)?;

        tracing::info!(account_id = %account.id, role = %account.role, "Login succeeded");

        Ok(AuthOutput { token, account })
    }

    /// Find the local account, creating it on first login
    async fn reconcile(&self, email: Email, provider_id: String) -> AuthResult<Account> {
        match self.store.get_by_email(&email).await {
            Ok(account) => return Ok(account),
            Err(AuthError::AccountNotFound) => {}
            Err(err) => return Err(err),
        }

        let account = Account::new(
            email.clone(),
            self.provider.provider_name(),
            provider_id,
            Role::User,
        );

        match self.store.create(&account).await {
            Ok(()) => {
                tracing::info!(account_id = %account.id, "Created local account on first login");
                Ok(account)
            }
            Err(AuthError::DuplicateKey(constraint)) => {
                tracing::warn!(%constraint, "Account already exists on first login, re-fetching");
                self.existing(&email, &account.auth_provider_id).await
            }
            Err(err) => Err(err),
        }
    }

    /// Row that won a create conflict, by email or by upstream identity
    async fn existing(&self, email: &Email, provider_id: &str) -> AuthResult<Account> {
        match self.store.get_by_email(email).await {
            Ok(account) => return Ok(account),
            Err(AuthError::AccountNotFound) => {}
            Err(err) => return Err(err),
        }

        match self
            .store
            .get_by_provider_id(self.provider.provider_name(), provider_id)
            .await
        {
            Ok(account) => Ok(account),
            Err(AuthError::AccountNotFound) => Err(AuthError::Internal(
                "account conflict on login could not be resolved".into(),
            )),
            Err(err) => Err(err),
        }
    }
}
