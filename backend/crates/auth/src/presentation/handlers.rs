//! HTTP Handlers
//!
//! JSON API for account auth and the admin panel.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::cookie::to_header_value;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountAdminUseCase, CreateAccountInput, LoginInput, LoginUseCase, RegisterInput,
    RegisterUseCase, UpdateAccountInput,
};
use crate::domain::provider::{IdentityProvider, ProviderFactory};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountId, Role};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenService;
use crate::presentation::dto::{
    AccountResponse, AdminLoginResponse, AuthResponse, CreateUserRequest, DashboardStatsResponse,
    ListUsersQuery, LoginRequest, MessageResponse, ProvidersResponse, RegisterRequest,
    TokenResponse, UpdateRoleRequest, UpdateUserRequest, UserListResponse, UserStatsResponse,
    VerifyResponse,
};
use crate::presentation::middleware::CurrentAccount;

/// Shared state for auth handlers
pub struct AuthAppState<S, P, F>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    pub store: Arc<S>,
    /// Default identity provider
    pub provider: Arc<P>,
    pub factory: Arc<F>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

impl<S, P, F> Clone for AuthAppState<S, P, F>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            provider: self.provider.clone(),
            factory: self.factory.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, P, F> AuthAppState<S, P, F>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    pub fn new(
        store: Arc<S>,
        provider: Arc<P>,
        factory: Arc<F>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            provider,
            factory,
            tokens,
            config,
        }
    }

    pub fn register_use_case(&self) -> RegisterUseCase<S, P> {
        RegisterUseCase::new(self.store.clone(), self.provider.clone(), self.tokens.clone())
    }

    pub fn login_use_case(&self) -> LoginUseCase<S, P> {
        LoginUseCase::new(self.store.clone(), self.provider.clone(), self.tokens.clone())
    }

    pub fn admin_use_case(&self) -> AccountAdminUseCase<S, F> {
        AccountAdminUseCase::new(self.store.clone(), self.factory.clone())
    }
}

/// Parse an account id from a path segment
pub fn parse_account_id(raw: &str) -> AuthResult<AccountId> {
    raw.parse()
        .map_err(|_| AuthError::MalformedParameters(format!("invalid account id: {}", raw)))
}

// ============================================================================
// Register / Login
// ============================================================================

/// POST /auth/register
pub async fn register<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let output = state
        .register_use_case()
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: output.token,
            user: AccountResponse::from(&output.account),
        }),
    ))
}

/// POST /auth/login
pub async fn login<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let output = state
        .login_use_case()
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(AuthResponse {
        token: output.token,
        user: AccountResponse::from(&output.account),
    }))
}

// ============================================================================
// Session
// ============================================================================

/// GET /auth/me
pub async fn me<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    CurrentAccount(ctx): CurrentAccount,
) -> AuthResult<Json<AccountResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let account = state.admin_use_case().get_me(&ctx.account_id).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// POST /auth/refresh
pub async fn refresh<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    CurrentAccount(ctx): CurrentAccount,
) -> AuthResult<Json<TokenResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let token = state.tokens.refresh_token(&ctx.token)?;
    let claims = state.tokens.validate_token(&token)?;

    Ok(Json(TokenResponse {
        token,
        expires_at: claims.expires_at(),
    }))
}

// ============================================================================
// Admin Session
// ============================================================================

/// POST /admin/login
pub async fn admin_login<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let output = state
        .login_use_case()
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    if !output.account.role.is_admin_or_higher() {
        return Err(AuthError::Forbidden("admin privileges required".into()));
    }

    let claims = state.tokens.validate_token(&output.token)?;
    let cookie = state.config.admin_cookie.build_set_cookie(&output.token);

    tracing::info!(account_id = %output.account.id, "Admin signed in");

    Ok((
        [(header::SET_COOKIE, to_header_value(&cookie))],
        Json(AdminLoginResponse {
            token: output.token,
            user: AccountResponse::from(&output.account),
            account_type: output.account.role,
            expires_at: claims.expires_at(),
        }),
    ))
}

/// POST /admin/logout
pub async fn admin_logout<S, P, F>(State(state): State<AuthAppState<S, P, F>>) -> impl IntoResponse
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let cookie = state.config.admin_cookie.build_delete_cookie();
    (
        [(header::SET_COOKIE, to_header_value(&cookie))],
        Json(MessageResponse::new("logged out")),
    )
}

/// GET /admin/verify
pub async fn verify(CurrentAccount(ctx): CurrentAccount) -> Json<VerifyResponse> {
    Json(VerifyResponse::from(&ctx.claims))
}

// ============================================================================
// Admin Account Management
// ============================================================================

/// GET /admin/dashboard/stats
pub async fn dashboard_stats<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
) -> AuthResult<Json<DashboardStatsResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let stats = state.admin_use_case().get_user_stats().await?;
    Ok(Json(DashboardStatsResponse::from(stats)))
}

/// GET /admin/users
pub async fn list_users<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Query(query): Query<ListUsersQuery>,
) -> AuthResult<Json<UserListResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(0);
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let role = match query.account_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => Some(code.parse::<Role>()?),
    };

    let use_case = state.admin_use_case();
    let result = if search.is_some() || role.is_some() {
        use_case.search_users(page, page_size, search, role).await?
    } else {
        use_case.list_users(page, page_size).await?
    };

    Ok(Json(UserListResponse::from(result)))
}

/// POST /admin/users
pub async fn create_user<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    CurrentAccount(ctx): CurrentAccount,
    Json(req): Json<CreateUserRequest>,
) -> AuthResult<(StatusCode, Json<AccountResponse>)>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let role = req.account_type.unwrap_or_default();
    if !ctx.role().satisfies(role) {
        return Err(AuthError::Forbidden(format!(
            "cannot create an account with role {}",
            role
        )));
    }

    let account = state
        .admin_use_case()
        .create_user(CreateAccountInput {
            email: req.email,
            password: req.password,
            provider: req.auth_provider,
            role: Some(role),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// GET /admin/users/stats
pub async fn user_stats<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
) -> AuthResult<Json<UserStatsResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let stats = state.admin_use_case().get_user_stats().await?;
    Ok(Json(UserStatsResponse::from(stats)))
}

/// GET /admin/users/{id}
pub async fn get_user<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Path(id): Path<String>,
) -> AuthResult<Json<AccountResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let account = state.admin_use_case().get_account(&parse_account_id(&id)?).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /admin/users/{id}
pub async fn update_user<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let account = state
        .admin_use_case()
        .update_user(
            &parse_account_id(&id)?,
            UpdateAccountInput {
                email: req.email,
                role: None,
            },
        )
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /admin/users/{id}/role
pub async fn update_user_role<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let account = state
        .admin_use_case()
        .update_user(
            &parse_account_id(&id)?,
            UpdateAccountInput {
                email: None,
                role: Some(req.account_type),
            },
        )
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// DELETE /admin/users/{id}
pub async fn delete_user<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(id): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    state
        .admin_use_case()
        .delete_user(&ctx.claims, &parse_account_id(&id)?)
        .await?;

    Ok(Json(MessageResponse::new("user deleted")))
}

/// GET /admin/auth-providers
pub async fn auth_providers<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
) -> Json<ProvidersResponse>
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let (providers, default_provider) = state.admin_use_case().providers();
    Json(ProvidersResponse {
        providers,
        default_provider,
    })
}
