//! Account Administration Use Case
//!
//! Profile lookup and the admin operations over stored accounts.

use std::sync::Arc;

use crate::application::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::application::register::register_account;
use crate::domain::entity::{Account, AccountStats, SessionClaims};
use crate::domain::provider::{IdentityProvider, ProviderFactory};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountId, Email, Role};
use crate::error::{AuthError, AuthResult};

/// Admin-side account creation
pub struct CreateAccountInput {
    pub email: String,
    pub password: String,
    /// Blank means the configured default
    pub provider: Option<String>,
    pub role: Option<Role>,
}

/// Fields to change; `None` leaves the field alone
#[derive(Debug, Default)]
pub struct UpdateAccountInput {
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// One page of accounts
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Highest page whose offset still fits in an `i64` at the largest page size
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Clamp paging input: page starts at 1, size defaults to 20 and caps at 100
pub fn clamp_paging(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.clamp(1, MAX_PAGE);
    let page_size = match page_size {
        s if s < 1 => DEFAULT_PAGE_SIZE,
        s => s.min(MAX_PAGE_SIZE),
    };
    (page, page_size)
}

fn page_offset(page: i64, page_size: i64) -> AuthResult<i64> {
    (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| AuthError::MalformedParameters("page out of range".into()))
}

fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 { 0 } else { (total - 1) / page_size + 1 }
}

/// Account administration use case
pub struct AccountAdminUseCase<S, F>
where
    S: AccountRepository,
    F: ProviderFactory,
{
    store: Arc<S>,
    factory: Arc<F>,
}

impl<S, F> AccountAdminUseCase<S, F>
where
    S: AccountRepository,
    F: ProviderFactory,
{
    pub fn new(store: Arc<S>, factory: Arc<F>) -> Self {
        Self { store, factory }
    }

    /// Account of the authenticated caller
    pub async fn get_me(&self, account_id: &AccountId) -> AuthResult<Account> {
        self.store.get_by_id(account_id).await
    }

    pub async fn get_account(&self, account_id: &AccountId) -> AuthResult<Account> {
        self.store.get_by_id(account_id).await
    }

    pub async fn create_user(&self, input: CreateAccountInput) -> AuthResult<Account> {
        let email = Email::new(input.email)?;
        let provider_name = input
            .provider
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.factory.default_provider().to_string());
        let provider = self.factory.create_provider(&provider_name)?;

        let account = register_account(
            self.store.as_ref(),
            &provider,
            email,
            &input.password,
            input.role.unwrap_or_default(),
        )
        .await?;

        tracing::info!(
            account_id = %account.id,
            provider = %provider_name,
            role = %account.role,
            "Account created by admin"
        );

        Ok(account)
    }

    pub async fn update_user(
        &self,
        account_id: &AccountId,
        input: UpdateAccountInput,
    ) -> AuthResult<Account> {
        let mut account = self.store.get_by_id(account_id).await?;

        if let Some(email) = input.email.filter(|e| !e.trim().is_empty()) {
            account.set_email(Email::new(email)?);
        }
        if let Some(role) = input.role {
            account.set_role(role);
        }

        self.store.update(&account).await?;

        tracing::info!(account_id = %account.id, role = %account.role, "Account updated");

        Ok(account)
    }

    /// Delete an account locally and, best effort, upstream
    pub async fn delete_user(
        &self,
        caller: &SessionClaims,
        account_id: &AccountId,
    ) -> AuthResult<()> {
        if caller.user_id == account_id.to_string() {
            return Err(AuthError::CannotDeleteSelf);
        }

        let account = self.store.get_by_id(account_id).await?;

        match self.factory.create_provider(&account.auth_provider) {
            Ok(provider) => {
                if let Err(err) = provider.delete_user(&account.auth_provider_id).await {
                    tracing::warn!(
                        account_id = %account.id,
                        provider = %account.auth_provider,
                        error = %err,
                        "Upstream delete failed, continuing with local delete"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(
                    account_id = %account.id,
                    provider = %account.auth_provider,
                    error = %err,
                    "Could not resolve provider for upstream delete"
                );
            }
        }

        self.store.delete(&account.id).await?;

        tracing::info!(account_id = %account.id, deleted_by = %caller.user_id, "Account deleted");

        Ok(())
    }

    pub async fn list_users(&self, page: i64, page_size: i64) -> AuthResult<AccountPage> {
        let (page, page_size) = clamp_paging(page, page_size);
        let offset = page_offset(page, page_size)?;

        let accounts = self.store.list(page_size, offset).await?;
        let total = self.store.count().await?;

        Ok(AccountPage {
            accounts,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        })
    }

    /// Filter one store page by email substring (case-sensitive) and exact role.
    ///
    /// `total` counts the filtered page only.
    pub async fn search_users(
        &self,
        page: i64,
        page_size: i64,
        search: Option<&str>,
        role: Option<Role>,
    ) -> AuthResult<AccountPage> {
        let (page, page_size) = clamp_paging(page, page_size);
        let offset = page_offset(page, page_size)?;

        let accounts: Vec<Account> = self
            .store
            .list(page_size, offset)
            .await?
            .into_iter()
            .filter(|a| a.matches(search, role))
            .collect();
        let total = accounts.len() as i64;

        Ok(AccountPage {
            accounts,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        })
    }

    pub async fn get_user_stats(&self) -> AuthResult<AccountStats> {
        self.store.stats().await
    }

    /// Provider names the factory can build, plus the default
    pub fn providers(&self) -> (Vec<String>, String) {
        (
            self.factory.supported_providers(),
            self.factory.default_provider().to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::test_support::{MemoryAccountStore, StubFactory, StubProvider, account, token_service};

    type UseCase = AccountAdminUseCase<MemoryAccountStore, StubFactory>;

    fn use_case(store: &Arc<MemoryAccountStore>, factory: StubFactory) -> UseCase {
        AccountAdminUseCase::new(store.clone(), Arc::new(factory))
    }

    fn claims_for(account: &Account) -> SessionClaims {
        let tokens = token_service();
        let token = tokens
            .generate_token(&account.id.to_string(), account.email.as_str(), account.role)
            .unwrap();
        tokens.validate_token(&token).unwrap()
    }

    #[test]
    fn test_clamp_paging() {
        assert_eq!(clamp_paging(0, 500), (1, 100));
        assert_eq!(clamp_paging(-3, 0), (1, 20));
        assert_eq!(clamp_paging(2, 50), (2, 50));
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(41, 20), 3);
    }

    #[tokio::test]
    async fn test_list_users_clamps() {
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![
            account("a@b.com", Role::User),
            account("c@d.com", Role::Admin),
        ]));
        let page = use_case(&store, StubFactory::default())
            .list_users(0, 500)
            .await
            .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 100);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.accounts.len(), 2);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let (page, size) = clamp_paging(i64::MAX, 500);
        assert_eq!(page, MAX_PAGE);
        assert!(page_offset(page, size).is_ok());
        assert!(matches!(
            page_offset(i64::MAX, 20),
            Err(AuthError::MalformedParameters(_))
        ));
        assert_eq!(total_pages(i64::MAX, 100), i64::MAX / 100 + 1);
    }

    #[tokio::test]
    async fn test_list_users_past_the_end_is_empty() {
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![account(
            "a@b.com",
            Role::User,
        )]));
        let uc = use_case(&store, StubFactory::default());

        let page = uc.list_users(i64::MAX, 20).await.unwrap();
        assert_eq!(page.page, MAX_PAGE);
        assert!(page.accounts.is_empty());
        assert_eq!(page.total, 1);

        let page = uc.search_users(i64::MAX, 20, Some("a"), None).await.unwrap();
        assert!(page.accounts.is_empty());
    }

    #[tokio::test]
    async fn test_delete_self_rejected_before_any_call() {
        let me = account("me@b.com", Role::Admin);
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![me.clone()]));
        let factory = StubFactory::default();

        let err = use_case(&store, factory.clone())
            .delete_user(&claims_for(&me), &me.id)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::CannotDeleteSelf));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(store.writes(), 0);
        assert_eq!(factory.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_tolerates_upstream_failure() {
        let admin = account("admin@b.com", Role::Admin);
        let target = account("gone@b.com", Role::User);
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![
            admin.clone(),
            target.clone(),
        ]));
        let factory = StubFactory {
            provider: StubProvider::default().failing_delete(),
            broken: false,
        };

        use_case(&store, factory.clone())
            .delete_user(&claims_for(&admin), &target.id)
            .await
            .unwrap();

        assert_eq!(factory.provider.state.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot(), vec![admin]);
    }

    #[tokio::test]
    async fn test_delete_tolerates_unresolvable_provider() {
        let admin = account("admin@b.com", Role::Admin);
        let target = account("gone@b.com", Role::User);
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![
            admin.clone(),
            target.clone(),
        ]));
        let factory = StubFactory {
            broken: true,
            ..StubFactory::default()
        };

        use_case(&store, factory)
            .delete_user(&claims_for(&admin), &target.id)
            .await
            .unwrap();

        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_account() {
        let admin = account("admin@b.com", Role::Admin);
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![admin.clone()]));

        let err = use_case(&store, StubFactory::default())
            .delete_user(&claims_for(&admin), &AccountId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::AccountNotFound));
    }

    #[tokio::test]
    async fn test_create_user_defaults() {
        let store = Arc::new(MemoryAccountStore::default());
        let factory = StubFactory {
            provider: StubProvider::registering("prov-7"),
            broken: false,
        };

        let created = use_case(&store, factory)
            .create_user(CreateAccountInput {
                email: "new@b.com".into(),
                password: "pw".into(),
                provider: Some("  ".into()),
                role: None,
            })
            .await
            .unwrap();

        assert_eq!(created.role, Role::User);
        assert_eq!(created.auth_provider, "supabase");
        assert_eq!(created.auth_provider_id, "prov-7");
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_unknown_provider() {
        let store = Arc::new(MemoryAccountStore::default());
        let err = use_case(&store, StubFactory::default())
            .create_user(CreateAccountInput {
                email: "new@b.com".into(),
                password: "pw".into(),
                provider: Some("okta".into()),
                role: Some(Role::Admin),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UnsupportedProvider(_)));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_update_user() {
        let target = account("old@b.com", Role::User);
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![target.clone()]));
        let uc = use_case(&store, StubFactory::default());

        let updated = uc
            .update_user(
                &target.id,
                UpdateAccountInput {
                    email: Some("new@b.com".into()),
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email.as_str(), "new@b.com");
        assert_eq!(updated.role, Role::Admin);
        assert!(updated.updated_at >= target.updated_at);
        assert_eq!(uc.get_account(&target.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_search_is_case_sensitive_and_counts_filtered() {
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![
            account("Alice@corp.com", Role::Admin),
            account("alice@home.com", Role::User),
            account("bob@corp.com", Role::User),
        ]));
        let uc = use_case(&store, StubFactory::default());

        let page = uc.search_users(1, 20, Some("Alice"), None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.accounts[0].email.as_str(), "Alice@corp.com");

        let page = uc.search_users(1, 20, Some("corp"), Some(Role::User)).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.accounts[0].email.as_str(), "bob@corp.com");
    }

    #[tokio::test]
    async fn test_user_stats() {
        let store = Arc::new(MemoryAccountStore::with_accounts(vec![
            account("a@b.com", Role::User),
            account("c@d.com", Role::Admin),
            account("e@f.com", Role::SuperAdmin),
        ]));
        let stats = use_case(&store, StubFactory::default())
            .get_user_stats()
            .await
            .unwrap();

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.admin_users, 1);
        assert_eq!(stats.super_admin_users, 1);
        assert_eq!(stats.regular_users, 1);
    }
}
