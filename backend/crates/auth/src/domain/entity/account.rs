//! Account Entity
//!
//! Durable identity record reconciled against the external identity provider.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{AccountId, Email, Role};

/// Account entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Opaque identifier, fixed at creation
    pub id: AccountId,
    /// Unique email
    pub email: Email,
    /// Name of the identity provider that owns the credential
    pub auth_provider: String,
    /// Identifier assigned by that provider
    pub auth_provider_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a fresh id
    pub fn new(
        email: Email,
        auth_provider: impl Into<String>,
        auth_provider_id: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: AccountId::new(),
            email,
            auth_provider: auth_provider.into(),
            auth_provider_id: auth_provider_id.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Case-sensitive substring match on email plus optional exact role
    pub fn matches(&self, search: Option<&str>, role: Option<Role>) -> bool {
        let email_ok = search
            .filter(|s| !s.is_empty())
            .is_none_or(|s| self.email.as_str().contains(s));
        let role_ok = role.is_none_or(|r| self.role == r);
        email_ok && role_ok
    }

    pub fn created_since(&self, since: DateTime<Utc>) -> bool {
        self.created_at >= since
    }
}

/// Aggregate account counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub super_admin_users: i64,
    pub regular_users: i64,
    /// Created within [`RECENT_SIGNUP_WINDOW_DAYS`]
    pub recent_signups: i64,
}

pub const RECENT_SIGNUP_WINDOW_DAYS: i64 = 7;

impl AccountStats {
    /// Start of the recent-signup window
    pub fn recent_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(RECENT_SIGNUP_WINDOW_DAYS)
    }

    /// Fold a slice of accounts into counts
    pub fn tally<'a>(accounts: impl IntoIterator<Item = &'a Account>, now: DateTime<Utc>) -> Self {
        let cutoff = Self::recent_cutoff(now);
        accounts
            .into_iter()
            .fold(AccountStats::default(), |mut stats, account| {
                stats.total_users += 1;
                match account.role {
                    Role::User => stats.regular_users += 1,
                    Role::Admin => stats.admin_users += 1,
                    Role::SuperAdmin => stats.super_admin_users += 1,
                }
                if account.created_since(cutoff) {
                    stats.recent_signups += 1;
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str, role: Role) -> Account {
        Account::new(Email::new(email).unwrap(), "supabase", "prov", role)
    }

    #[test]
    fn test_new_account() {
        let a = account("a@b.com", Role::User);
        assert!(!a.id.as_uuid().is_nil());
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(a.auth_provider, "supabase");
    }

    #[test]
    fn test_set_role_bumps_updated_at() {
        let mut a = account("a@b.com", Role::User);
        let before = a.updated_at;
        a.set_role(Role::Admin);
        assert_eq!(a.role, Role::Admin);
        assert!(a.updated_at >= before);
    }

    #[test]
    fn test_matches() {
        let a = account("Alice@Example.com", Role::Admin);
        assert!(a.matches(None, None));
        assert!(a.matches(Some("Example"), None));
        assert!(!a.matches(Some("example"), None));
        assert!(a.matches(Some(""), Some(Role::Admin)));
        assert!(!a.matches(Some("Alice"), Some(Role::User)));
    }

    #[test]
    fn test_tally() {
        let now = Utc::now();
        let mut old = account("old@b.com", Role::User);
        old.created_at = now - Duration::days(30);
        let accounts = vec![
            old,
            account("a@b.com", Role::Admin),
            account("s@b.com", Role::SuperAdmin),
            account("u@b.com", Role::User),
        ];

        let stats = AccountStats::tally(&accounts, now);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.admin_users, 1);
        assert_eq!(stats.super_admin_users, 1);
        assert_eq!(stats.regular_users, 2);
        assert_eq!(stats.recent_signups, 3);
    }
}
