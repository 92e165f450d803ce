//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Account, AccountStats};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountId, Email, Role};
use crate::error::{AuthError, AuthResult};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning unique violations into `DuplicateKey`
fn map_write_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db.constraint().unwrap_or("accounts").to_string();
            return AuthError::DuplicateKey(constraint);
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id,
                email,
                auth_provider,
                auth_provider_id,
                account_type,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.email.as_str())
        .bind(&account.auth_provider)
        .bind(&account.auth_provider_id)
        .bind(account.role.code())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn get_by_id(&self, id: &AccountId) -> AuthResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                id,
                email,
                auth_provider,
                auth_provider_id,
                account_type,
                created_at,
                updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuthError::AccountNotFound)?.into_account()
    }

    async fn get_by_email(&self, email: &Email) -> AuthResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                id,
                email,
                auth_provider,
                auth_provider_id,
                account_type,
                created_at,
                updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuthError::AccountNotFound)?.into_account()
    }

    async fn get_by_provider_id(&self, provider: &str, provider_id: &str) -> AuthResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                id,
                email,
                auth_provider,
                auth_provider_id,
                account_type,
                created_at,
                updated_at
            FROM accounts
            WHERE auth_provider = $1 AND auth_provider_id = $2
            "#,
        )
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuthError::AccountNotFound)?.into_account()
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                email = $2,
                account_type = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.role.code())
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> AuthResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }

        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                id,
                email,
                auth_provider,
                auth_provider_id,
                account_type,
                created_at,
                updated_at
            FROM accounts
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    async fn count(&self) -> AuthResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_role(&self, role: Role) -> AuthResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE account_type = $1")
            .bind(role.code())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn stats(&self) -> AuthResult<AccountStats> {
        let (total_users, admin_users, super_admin_users, regular_users, recent_signups): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE account_type = 'admin'),
                COUNT(*) FILTER (WHERE account_type = 'super_admin'),
                COUNT(*) FILTER (WHERE account_type = 'user'),
                COUNT(*) FILTER (WHERE created_at >= $1)
            FROM accounts
            "#,
        )
        .bind(AccountStats::recent_cutoff(Utc::now()))
        .fetch_one(&self.pool)
        .await?;

        Ok(AccountStats {
            total_users,
            admin_users,
            super_admin_users,
            regular_users,
            recent_signups,
        })
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    auth_provider: String,
    auth_provider_id: String,
    account_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = Role::from_code(&self.account_type).ok_or_else(|| {
            AuthError::Internal(format!("Invalid account_type in store: {}", self.account_type))
        })?;

        Ok(Account {
            id: AccountId::from_uuid(self.id),
            email: Email::from_db(self.email),
            auth_provider: self.auth_provider,
            auth_provider_id: self.auth_provider_id,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
