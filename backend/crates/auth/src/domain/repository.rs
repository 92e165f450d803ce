//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{Account, AccountStats};
use crate::domain::value_object::{AccountId, Email, Role};
use crate::error::AuthResult;

/// Account store.
///
/// Lookups that find nothing return `AuthError::AccountNotFound`;
/// a create that violates email or provider identity uniqueness
/// returns `AuthError::DuplicateKey`.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn get_by_id(&self, id: &AccountId) -> AuthResult<Account>;

    async fn get_by_email(&self, email: &Email) -> AuthResult<Account>;

    async fn get_by_provider_id(&self, provider: &str, provider_id: &str) -> AuthResult<Account>;

    /// Persist email, role and `updated_at`
    async fn update(&self, account: &Account) -> AuthResult<()>;

    async fn delete(&self, id: &AccountId) -> AuthResult<()>;

    /// Newest first
    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Account>>;

    async fn count(&self) -> AuthResult<i64>;

    async fn count_by_role(&self, role: Role) -> AuthResult<i64>;

    async fn stats(&self) -> AuthResult<AccountStats>;
}
