//! In-memory doubles for use case and handler tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{Account, AccountStats};
use crate::domain::provider::{IdentityProvider, ProviderAccount, ProviderError, ProviderFactory};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountId, Email, Role};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenService;

pub const TEST_SECRET: &str = "test-secret";

pub fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(TEST_SECRET, "test", Duration::from_secs(3600)))
}

pub fn test_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_issuer: "test".to_string(),
        ..AuthConfig::development()
    })
}

pub fn account(email: &str, role: Role) -> Account {
    Account::new(
        Email::new(email).unwrap(),
        "supabase",
        format!("prov-{}", email),
        role,
    )
}

// ============================================================================
// Account store
// ============================================================================

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub lookups: AtomicUsize,
    /// Report this many upcoming email lookups as misses even if the row exists
    pub missed_email_lookups: AtomicUsize,
    /// Make every lookup fail with a database-like error
    pub fail_lookups: AtomicBool,
}

impl MemoryAccountStore {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn find(&self, pred: impl Fn(&Account) -> bool) -> AuthResult<Account> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AuthError::Internal("store offline".into()));
        }
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| pred(a))
            .cloned()
            .ok_or(AuthError::AccountNotFound)
    }
}

impl AccountRepository for MemoryAccountStore {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AuthError::DuplicateKey("accounts_email_key".into()));
        }
        if accounts.iter().any(|a| {
            a.auth_provider == account.auth_provider && a.auth_provider_id == account.auth_provider_id
        }) {
            return Err(AuthError::DuplicateKey("accounts_provider_identity_key".into()));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        accounts.push(account.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &AccountId) -> AuthResult<Account> {
        self.find(|a| a.id == *id)
    }

    async fn get_by_email(&self, email: &Email) -> AuthResult<Account> {
        let missed = self
            .missed_email_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if missed.is_ok() {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            return Err(AuthError::AccountNotFound);
        }
        self.find(|a| a.email == *email)
    }

    async fn get_by_provider_id(&self, provider: &str, provider_id: &str) -> AuthResult<Account> {
        self.find(|a| a.auth_provider == provider && a.auth_provider_id == provider_id)
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let slot = accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or(AuthError::AccountNotFound)?;
        *slot = account.clone();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| a.id != *id);
        if accounts.len() == before {
            return Err(AuthError::AccountNotFound);
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Account>> {
        let mut accounts = self.snapshot();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> AuthResult<i64> {
        Ok(self.accounts.lock().unwrap().len() as i64)
    }

    async fn count_by_role(&self, role: Role) -> AuthResult<i64> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.role == role)
            .count() as i64)
    }

    async fn stats(&self) -> AuthResult<AccountStats> {
        Ok(AccountStats::tally(&self.snapshot(), Utc::now()))
    }
}

// ============================================================================
// Identity provider
// ============================================================================

#[derive(Default)]
pub struct StubProviderState {
    pub register_result: Mutex<Option<Result<String, ProviderError>>>,
    pub login_result: Mutex<Option<Result<String, ProviderError>>>,
    pub delete_result: Mutex<Option<Result<(), ProviderError>>>,
    pub registers: AtomicUsize,
    pub logins: AtomicUsize,
    pub deletes: AtomicUsize,
}

/// Scripted provider; unscripted calls succeed with fixed ids
#[derive(Clone, Default)]
pub struct StubProvider {
    pub state: Arc<StubProviderState>,
}

impl StubProvider {
    pub fn registering(id: &str) -> Self {
        let provider = Self::default();
        *provider.state.register_result.lock().unwrap() = Some(Ok(id.to_string()));
        provider
    }

    pub fn logging_in(id: &str) -> Self {
        let provider = Self::default();
        *provider.state.login_result.lock().unwrap() = Some(Ok(id.to_string()));
        provider
    }

    pub fn rejecting() -> Self {
        let provider = Self::default();
        let rejected = ProviderError::Rejected("invalid credentials".into());
        *provider.state.register_result.lock().unwrap() = Some(Err(rejected.clone()));
        *provider.state.login_result.lock().unwrap() = Some(Err(rejected.clone()));
        *provider.state.delete_result.lock().unwrap() = Some(Err(rejected));
        provider
    }

    pub fn failing_delete(self) -> Self {
        *self.state.delete_result.lock().unwrap() =
            Some(Err(ProviderError::Unavailable("timeout".into())));
        self
    }

    pub fn calls(&self) -> usize {
        self.state.registers.load(Ordering::SeqCst)
            + self.state.logins.load(Ordering::SeqCst)
            + self.state.deletes.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for StubProvider {
    fn provider_name(&self) -> &str {
        "supabase"
    }

    async fn register_user(&self, _email: &str, _password: &str) -> Result<String, ProviderError> {
        self.state.registers.fetch_add(1, Ordering::SeqCst);
        self.state
            .register_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok("prov-registered".into()))
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<String, ProviderError> {
        self.state.logins.fetch_add(1, Ordering::SeqCst);
        self.state
            .login_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok("prov-login".into()))
    }

    async fn validate_token(&self, _token: &str) -> Result<ProviderAccount, ProviderError> {
        Err(ProviderError::Unsupported("validate_token".into()))
    }

    async fn delete_user(&self, _external_id: &str) -> Result<(), ProviderError> {
        self.state.deletes.fetch_add(1, Ordering::SeqCst);
        self.state
            .delete_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(()))
    }
}

/// Factory handing out a shared stub for the names it knows
#[derive(Clone, Default)]
pub struct StubFactory {
    pub provider: StubProvider,
    /// Fail every creation
    pub broken: bool,
}

impl ProviderFactory for StubFactory {
    type Provider = StubProvider;

    fn create_provider(&self, name: &str) -> AuthResult<StubProvider> {
        if self.broken || name != "supabase" {
            return Err(AuthError::UnsupportedProvider(name.to_string()));
        }
        Ok(self.provider.clone())
    }

    fn supported_providers(&self) -> Vec<String> {
        vec!["supabase".to_string()]
    }

    fn default_provider(&self) -> &str {
        "supabase"
    }
}
