//! Browser Handlers
//!
//! Form login and cookie sessions for the web front end and admin panel.

use axum::Form;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use platform::cookie::{CookieConfig, to_header_value};

use crate::application::config::AuthConfig;
use crate::application::{AuthOutput, LoginInput, RegisterInput};
use crate::domain::provider::{IdentityProvider, ProviderFactory};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountResponse, DashboardStatsResponse, SessionStatusResponse, WebLoginForm,
    WebRegisterForm,
};
use crate::presentation::handlers::AuthAppState;
use crate::presentation::middleware::{CurrentAccount, MaybeAccount};

const DEFAULT_LANDING: &str = "/dashboard";
const ADMIN_LANDING: &str = "/admin";

/// Only same-site absolute paths are followed after login
fn safe_redirect(target: Option<&str>, fallback: &str) -> String {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => t.to_string(),
        _ => fallback.to_string(),
    }
}

fn redirect_with_cookies(location: &str, cookies: impl IntoIterator<Item = String>) -> Response {
    let mut response = (
        StatusCode::FOUND,
        [(header::LOCATION, to_header_value(location))],
    )
        .into_response();
    for cookie in cookies {
        response
            .headers_mut()
            .append(header::SET_COOKIE, to_header_value(&cookie));
    }
    response
}

fn login_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::AuthenticationFailed | AuthError::MalformedParameters(_) => {
            "invalid_credentials"
        }
        AuthError::Forbidden(_) => "access_denied",
        _ => "server_error",
    }
}

fn register_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::DuplicateKey(_) => "email_exists",
        AuthError::MalformedParameters(_) => "invalid_email",
        _ => "registration_failed",
    }
}

/// Session cookie plus its script-readable companions.
///
/// Companion values are percent-encoded; read them with `decodeURIComponent`.
fn session_cookies(config: &AuthConfig, output: &AuthOutput) -> Vec<String> {
    let values = [
        output.account.id.to_string(),
        output.account.email.to_string(),
        output.account.role.code().to_string(),
    ];
    std::iter::once(config.web_cookie.build_set_cookie(&output.token))
        .chain(
            config
                .web_companion_cookies()
                .iter()
                .zip(values)
                .map(|(cookie, value)| cookie.build_set_cookie(&urlencoding::encode(&value))),
        )
        .collect()
}

// ============================================================================
// Web Session
// ============================================================================

/// POST /web/login
pub async fn web_login<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Form(form): Form<WebLoginForm>,
) -> Response
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let result = state
        .login_use_case()
        .execute(LoginInput {
            email: form.email,
            password: form.password,
        })
        .await;

    match result {
        Ok(output) => {
            let location = safe_redirect(form.redirect.as_deref(), DEFAULT_LANDING);
            redirect_with_cookies(&location, session_cookies(&state.config, &output))
        }
        Err(err) => {
            tracing::debug!(error = %err, "Web login failed");
            let location = format!("{}?error={}", state.config.login_path, login_error_code(&err));
            redirect_with_cookies(&location, [])
        }
    }
}

/// POST /web/register
pub async fn web_register<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Form(form): Form<WebRegisterForm>,
) -> Response
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let back = |code: &str| {
        redirect_with_cookies(&format!("{}?error={}", state.config.register_path, code), [])
    };

    if form.email.trim().is_empty() || form.password.is_empty() {
        return back("missing_credentials");
    }
    if form.password != form.confirm_password {
        return back("password_mismatch");
    }

    let result = state
        .register_use_case()
        .execute(RegisterInput {
            email: form.email,
            password: form.password,
        })
        .await;

    match result {
        Ok(output) => redirect_with_cookies(DEFAULT_LANDING, session_cookies(&state.config, &output)),
        Err(err) => {
            tracing::debug!(error = %err, "Web registration failed");
            back(register_error_code(&err))
        }
    }
}

/// POST /web/logout
pub async fn web_logout<S, P, F>(State(state): State<AuthAppState<S, P, F>>) -> Response
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let companions = state.config.web_companion_cookies();
    let cookies: Vec<String> = std::iter::once(&state.config.web_cookie)
        .chain(&companions)
        .map(CookieConfig::build_delete_cookie)
        .collect();
    redirect_with_cookies(&state.config.login_path, cookies)
}

/// GET /web/session
pub async fn web_session(MaybeAccount(ctx): MaybeAccount) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse::from(ctx.as_ref().map(|c| &c.claims)))
}

/// GET /web/account
pub async fn web_account<S, P, F>(
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

// ============================================================================
// Admin Panel
// ============================================================================

/// POST /web/admin/login
pub async fn admin_panel_login<S, P, F>(
    State(state): State<AuthAppState<S, P, F>>,
    Form(form): Form<WebLoginForm>,
) -> Response
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let result = state
        .login_use_case()
        .execute(LoginInput {
            email: form.email,
            password: form.password,
        })
        .await
        .and_then(|output| {
            if output.account.role.is_admin_or_higher() {
                Ok(output)
            } else {
                Err(AuthError::Forbidden("admin privileges required".into()))
            }
        });

    match result {
        Ok(output) => {
            let location = safe_redirect(form.redirect.as_deref(), ADMIN_LANDING);
            let cookie = state.config.admin_cookie.build_set_cookie(&output.token);
            redirect_with_cookies(&location, [cookie])
        }
        Err(err) => {
            tracing::debug!(error = %err, "Admin panel login failed");
            let location = format!(
                "{}?error={}",
                state.config.admin_login_path,
                login_error_code(&err)
            );
            redirect_with_cookies(&location, [])
        }
    }
}

/// GET /web/admin/dashboard
pub async fn admin_panel_dashboard<S, P, F>(
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
