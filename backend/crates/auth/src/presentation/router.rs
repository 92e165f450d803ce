//! Auth Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::provider::{IdentityProvider, ProviderFactory};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::Role;
use crate::infra::jwt::TokenService;
use crate::infra::postgres::PgAccountRepository;
use crate::infra::provider_factory::{AnyProvider, ConfiguredProviderFactory};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    AccessGate, BrowserSurface, GateState, optional_auth, require_role,
};
use crate::presentation::web_handlers;

/// JSON API routes, meant to be nested under `/api/v1`
pub fn api_router<S, P, F>(state: AuthAppState<S, P, F>) -> Router
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let gate = AccessGate::new(state.tokens.clone());
    let admin_cookie = state.config.admin_cookie.name.clone();

    let public = Router::new()
        .route("/auth/register", post(handlers::register::<S, P, F>))
        .route("/auth/login", post(handlers::login::<S, P, F>))
        .route("/admin/login", post(handlers::admin_login::<S, P, F>))
        .route("/admin/logout", post(handlers::admin_logout::<S, P, F>));

    let user = Router::new()
        .route("/auth/me", get(handlers::me::<S, P, F>))
        .route("/auth/refresh", post(handlers::refresh::<S, P, F>))
        .route_layer(from_fn_with_state(
            GateState::api(gate.clone(), Role::User),
            require_role,
        ));

    let admin = Router::new()
        .route("/admin/verify", get(handlers::verify))
        .route("/admin/dashboard/stats", get(handlers::dashboard_stats::<S, P, F>))
        .route(
            "/admin/users",
            get(handlers::list_users::<S, P, F>).post(handlers::create_user::<S, P, F>),
        )
        .route("/admin/users/stats", get(handlers::user_stats::<S, P, F>))
        .route(
            "/admin/users/{id}",
            get(handlers::get_user::<S, P, F>)
                .put(handlers::update_user::<S, P, F>)
                .delete(handlers::delete_user::<S, P, F>),
        )
        .route("/admin/auth-providers", get(handlers::auth_providers::<S, P, F>))
        .route_layer(from_fn_with_state(
            GateState::api_with_cookie(gate.clone(), Role::Admin, admin_cookie.clone()),
            require_role,
        ));

    let super_admin = Router::new()
        .route(
            "/admin/users/{id}/role",
            put(handlers::update_user_role::<S, P, F>),
        )
        .route_layer(from_fn_with_state(
            GateState::api_with_cookie(gate, Role::SuperAdmin, admin_cookie),
            require_role,
        ));

    Router::new()
        .merge(public)
        .merge(user)
        .merge(admin)
        .merge(super_admin)
        .with_state(state)
}

/// Browser routes (cookie sessions, redirects)
pub fn web_router<S, P, F>(state: AuthAppState<S, P, F>) -> Router
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    let gate = AccessGate::new(state.tokens.clone());
    let web = BrowserSurface::web(&state.config);
    let panel = BrowserSurface::admin(&state.config);

    let public = Router::new()
        .route("/web/login", post(web_handlers::web_login::<S, P, F>))
        .route("/web/register", post(web_handlers::web_register::<S, P, F>))
        .route("/web/logout", post(web_handlers::web_logout::<S, P, F>))
        .route("/web/admin/login", post(web_handlers::admin_panel_login::<S, P, F>));

    let session = Router::new()
        .route("/web/session", get(web_handlers::web_session))
        .route_layer(from_fn_with_state(
            GateState::browser(gate.clone(), Role::User, web.clone()),
            optional_auth,
        ));

    let account = Router::new()
        .route("/web/account", get(web_handlers::web_account::<S, P, F>))
        .route_layer(from_fn_with_state(
            GateState::browser(gate.clone(), Role::User, web),
            require_role,
        ));

    let admin_panel = Router::new()
        .route(
            "/web/admin/dashboard",
            get(web_handlers::admin_panel_dashboard::<S, P, F>),
        )
        .route_layer(from_fn_with_state(
            GateState::browser(gate, Role::Admin, panel),
            require_role,
        ));

    Router::new()
        .merge(public)
        .merge(session)
        .merge(account)
        .merge(admin_panel)
        .with_state(state)
}

/// API under `/api/v1` plus the browser routes, for any backend
pub fn auth_router_generic<S, P, F>(state: AuthAppState<S, P, F>) -> Router
where
    S: AccountRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    F: ProviderFactory + 'static,
{
    Router::new()
        .nest("/api/v1", api_router(state.clone()))
        .merge(web_router(state))
}

/// Create the Auth router with the PostgreSQL store and configured providers
pub fn auth_router(
    store: PgAccountRepository,
    factory: ConfiguredProviderFactory,
    config: AuthConfig,
) -> crate::error::AuthResult<Router> {
    let provider: AnyProvider = factory.create_default()?;
    let tokens = TokenService::from_config(&config);

    let state = AuthAppState::new(
        Arc::new(store),
        Arc::new(provider),
        Arc::new(factory),
        Arc::new(tokens),
        Arc::new(config),
    );

    Ok(auth_router_generic(state))
}
