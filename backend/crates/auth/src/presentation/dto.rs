//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::AccountPage;
use crate::domain::entity::{Account, AccountStats, SessionClaims};
use crate::domain::value_object::Role;

// ============================================================================
// Accounts
// ============================================================================

/// Public view of an account; the provider-side id stays internal
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub auth_provider: String,
    pub account_type: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.to_string(),
            auth_provider: account.auth_provider.clone(),
            account_type: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

// ============================================================================
// Register / Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus account, returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Admin session
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub user: AccountResponse,
    pub account_type: Role,
    pub expires_at: DateTime<Utc>,
}

/// Claims summary for the admin panel
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: String,
    pub account_type: Role,
    pub expires_at: DateTime<Utc>,
}

impl From<&SessionClaims> for VerifyResponse {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            valid: true,
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            account_type: claims.account_type,
            expires_at: claims.expires_at(),
        }
    }
}

// ============================================================================
// Admin account management
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    /// Role code; blank means any
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<AccountResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl From<AccountPage> for UserListResponse {
    fn from(page: AccountPage) -> Self {
        Self {
            users: page.accounts.iter().map(AccountResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub account_type: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub account_type: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatsResponse {
    pub total_users: i64,
    pub admin_users: i64,
    pub super_admin_users: i64,
    pub regular_users: i64,
    pub recent_signups: i64,
}

impl From<AccountStats> for UserStatsResponse {
    fn from(stats: AccountStats) -> Self {
        Self {
            total_users: stats.total_users,
            admin_users: stats.admin_users,
            super_admin_users: stats.super_admin_users,
            regular_users: stats.regular_users,
            recent_signups: stats.recent_signups,
        }
    }
}

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatsResponse {
    pub total_users: i64,
    /// Admins and super admins together
    pub admin_users: i64,
    pub recent_signups: i64,
}

impl From<AccountStats> for DashboardStatsResponse {
    fn from(stats: AccountStats) -> Self {
        Self {
            total_users: stats.total_users,
            admin_users: stats.admin_users + stats.super_admin_users,
            recent_signups: stats.recent_signups,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<String>,
    pub default_provider: String,
}

// ============================================================================
// Browser
// ============================================================================

/// Login form posted by the browser front end
#[derive(Debug, Clone, Deserialize)]
pub struct WebLoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Registration form posted by the browser front end
#[derive(Debug, Clone, Deserialize)]
pub struct WebRegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Session status response
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub account_type: Option<Role>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Option<&SessionClaims>> for SessionStatusResponse {
    fn from(claims: Option<&SessionClaims>) -> Self {
        Self {
            authenticated: claims.is_some(),
            user_id: claims.map(|c| c.user_id.clone()),
            email: claims.map(|c| c.email.clone()),
            account_type: claims.map(|c| c.account_type),
            expires_at: claims.map(SessionClaims::expires_at),
        }
    }
}
