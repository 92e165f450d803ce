//! Register Use Case
//!
//! Creates the identity upstream, records it locally and issues a session token.

use std::sync::Arc;

use crate::domain::entity::Account;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{Email, Role};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenService;

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Token plus the account it was issued for
#[derive(Debug, Clone)]
pub struct AuthOutput {
    pub token: String,
    pub account: Account,
}

/// Register use case
pub struct RegisterUseCase<S, P>
where
    S: AccountRepository,
    P: IdentityProvider,
{
    store: Arc<S>,
    provider: Arc<P>,
    tokens: Arc<TokenService>,
}

impl<S, P> RegisterUseCase<S, P>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<AuthOutput> {
        let email = Email::new(input.email)?;
        let account = register_account(
            self.store.as_ref(),
            self.provider.as_ref(),
            email,
            &input.password,
            Role::User,
        )
        .await?;

        let token = self
            .tokens
            .generate_token(&account.id.to_string(), account.email.as_str(), account.role)?;

        tracing::info!(
            account_id = %account.id,
            provider = %account.auth_provider,
            "Account registered"
        );

        Ok(AuthOutput { token, account })
    }
}

/// Register upstream, then persist the local record.
///
/// Upstream registration is not rolled back when the local write fails.
pub(crate) async fn register_account<S, P>(
    store: &S,
    provider: &P,
    email: Email,
    password: &str,
    role: Role,
) -> AuthResult<Account>
where
    S: AccountRepository,
    P: IdentityProvider,
{
    let provider_id = provider
        .register_user(email.as_str(), password)
        .await
        .map_err(AuthError::RegistrationFailed)?;

    let account = Account::new(email, provider.provider_name(), provider_id, role);

    if let Err(err) = store.create(&account).await {
        tracing::error!(
            provider = %account.auth_provider,
            provider_id = %account.auth_provider_id,
            error = %err,
            "Local account write failed after upstream registration; upstream identity orphaned"
        );
        return Err(match err {
            AuthError::DuplicateKey(_) => AuthError::DuplicateKey("user already exists".into()),
            other => other,
        });
    }

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::ProviderError;
    use crate::test_support::{MemoryAccountStore, StubProvider, account, token_service};

    fn use_case(
        store: &Arc<MemoryAccountStore>,
        provider: StubProvider,
    ) -> RegisterUseCase<MemoryAccountStore, StubProvider> {
        RegisterUseCase::new(store.clone(), Arc::new(provider), token_service())
    }

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_account() {
        let store = Arc::new(MemoryAccountStore::default());
        let tokens = token_service();
        let use_case = RegisterUseCase::new(
            store.clone(),
            Arc::new(StubProvider::registering("prov-1")),
            tokens.clone(),
        );

        let output = use_case.execute(input("a@b.com")).await.unwrap();

        assert_eq!(output.account.email.as_str(), "a@b.com");
        assert_eq!(output.account.auth_provider, "supabase");
        assert_eq!(output.account.auth_provider_id, "prov-1");
        assert_eq!(output.account.role, Role::User);
        assert_eq!(store.snapshot(), vec![output.account.clone()]);

        let claims = tokens.validate_token(&output.token).unwrap();
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.user_id, output.account.id.to_string());
        assert_eq!(claims.account_type, Role::User);
    }

    #[tokio::test]
    async fn test_upstream_failure_writes_nothing() {
        let store = Arc::new(MemoryAccountStore::default());
        let err = use_case(&store, StubProvider::rejecting())
            .execute(input("a@b.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuthError::RegistrationFailed(ProviderError::Rejected(_))
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_surfaces_already_exists() {
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![account(
            "a@b.com",
            Role::User,
        )]));
        let provider = StubProvider::registering("prov-2");
        let err = use_case(&store, provider.clone())
            .execute(input("a@b.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateKey(m) if m.contains("already exists")));
        assert_eq!(provider.state.deletes.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_provider() {
        let store = Arc::new(MemoryAccountStore::default());
        let provider = StubProvider::default();
        let err = use_case(&store, provider.clone())
            .execute(input("not-an-email"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MalformedParameters(_)));
        assert_eq!(provider.calls(), 0);
    }
}
