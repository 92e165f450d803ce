//! Access Control Middleware
//!
//! Per request: locate a credential, verify it, compare the role with the
//! route's minimum. API routes answer 401/403; browser routes redirect.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use platform::bearer::extract_bearer;
use platform::cookie::{CookieConfig, extract_cookie, to_header_value};

use crate::application::config::AuthConfig;
use crate::domain::entity::SessionClaims;
use crate::domain::value_object::{AccountId, Role};
use crate::error::AuthError;
use crate::infra::jwt::TokenService;

// ============================================================================
// Gate
// ============================================================================

/// Verified identity attached to the request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: SessionClaims,
    pub account_id: AccountId,
    /// The credential as presented
    pub token: String,
}

impl AuthContext {
    pub fn role(&self) -> Role {
        self.claims.account_type
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }
}

/// Why the gate refused a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    MissingCredentials,
    InvalidToken(String),
    InsufficientRole { required: Role, actual: Role },
}

impl From<GateRejection> for AuthError {
    fn from(rejection: GateRejection) -> Self {
        match rejection {
            GateRejection::MissingCredentials => {
                AuthError::MissingCredentials("authorization required".into())
            }
            GateRejection::InvalidToken(reason) => AuthError::InvalidToken(reason),
            GateRejection::InsufficientRole { required, .. } => {
                AuthError::Forbidden(format!("{} privileges required", required))
            }
        }
    }
}

/// Credential check shared by every middleware
#[derive(Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
}

impl AccessGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Verify a credential without a role requirement
    pub fn authenticate(&self, credential: Option<&str>) -> Result<AuthContext, GateRejection> {
        let token = credential
            .filter(|t| !t.is_empty())
            .ok_or(GateRejection::MissingCredentials)?;

        let claims = self
            .tokens
            .validate_token(token)
            .map_err(|e| GateRejection::InvalidToken(e.to_string()))?;
        let account_id = claims
            .account_id()
            .map_err(|e| GateRejection::InvalidToken(e.to_string()))?;

        Ok(AuthContext {
            claims,
            account_id,
            token: token.to_string(),
        })
    }

    /// Verify a credential and require at least `required`
    pub fn authorize(
        &self,
        credential: Option<&str>,
        required: Role,
    ) -> Result<AuthContext, GateRejection> {
        let context = self.authenticate(credential)?;

        if !context.role().satisfies(required) {
            return Err(GateRejection::InsufficientRole {
                required,
                actual: context.role(),
            });
        }

        Ok(context)
    }
}

/// Bearer header first, then the named cookie
pub fn locate_credential(headers: &HeaderMap, cookie_name: Option<&str>) -> Option<String> {
    extract_bearer(headers)
        .ok()
        .or_else(|| cookie_name.and_then(|name| extract_cookie(headers, name)))
}

// ============================================================================
// Surfaces
// ============================================================================

/// How a browser surface reacts to rejection
#[derive(Debug, Clone)]
pub struct BrowserSurface {
    /// Cookie holding the session token
    pub cookie: CookieConfig,
    /// Cleared together with the session cookie
    pub companions: Vec<CookieConfig>,
    pub login_path: String,
    pub denied_path: String,
}

impl BrowserSurface {
    /// User-facing pages (`token` cookie)
    pub fn web(config: &AuthConfig) -> Self {
        Self {
            cookie: config.web_cookie.clone(),
            companions: config.web_companion_cookies(),
            login_path: config.login_path.clone(),
            denied_path: config.access_denied_path.clone(),
        }
    }

    /// Admin panel pages (`admin_token` cookie)
    pub fn admin(config: &AuthConfig) -> Self {
        Self {
            cookie: config.admin_cookie.clone(),
            companions: Vec::new(),
            login_path: config.admin_login_path.clone(),
            denied_path: config.access_denied_path.clone(),
        }
    }

    fn clear_cookies(&self, response: &mut Response) {
        for cookie in std::iter::once(&self.cookie).chain(&self.companions) {
            response
                .headers_mut()
                .append(header::SET_COOKIE, to_header_value(&cookie.build_delete_cookie()));
        }
    }

    fn reject(&self, headers: &HeaderMap, path: &str, rejection: GateRejection) -> Response {
        let redirect = urlencoding::encode(path);
        match rejection {
            GateRejection::MissingCredentials => {
                found(&format!("{}?redirect={}", self.login_path, redirect))
            }
            GateRejection::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Browser session rejected");
                let mut response = found(&format!(
                    "{}?error=session_expired&redirect={}",
                    self.login_path, redirect
                ));
                self.clear_cookies(&mut response);
                response
            }
            GateRejection::InsufficientRole { required, actual } => {
                tracing::warn!(required = %required, actual = %actual, path = %path, "Access denied");
                if is_ajax(headers) {
                    (
                        StatusCode::FORBIDDEN,
                        format!("Access denied: {} privileges required", required),
                    )
                        .into_response()
                } else {
                    found(&format!("{}?error=access_denied", self.denied_path))
                }
            }
        }
    }
}

/// Which surface a gated route belongs to
#[derive(Debug, Clone)]
pub enum Surface {
    Api { cookie: Option<String> },
    Browser(BrowserSurface),
}

impl Surface {
    fn cookie_name(&self) -> Option<&str> {
        match self {
            Surface::Api { cookie } => cookie.as_deref(),
            Surface::Browser(browser) => Some(&browser.cookie.name),
        }
    }
}

/// State for the gate middlewares
#[derive(Clone)]
pub struct GateState {
    pub gate: AccessGate,
    pub required: Role,
    pub surface: Surface,
}

impl GateState {
    /// API route: bearer header only
    pub fn api(gate: AccessGate, required: Role) -> Self {
        Self {
            gate,
            required,
            surface: Surface::Api { cookie: None },
        }
    }

    /// API route that also accepts a named cookie
    pub fn api_with_cookie(gate: AccessGate, required: Role, cookie: impl Into<String>) -> Self {
        Self {
            gate,
            required,
            surface: Surface::Api {
                cookie: Some(cookie.into()),
            },
        }
    }

    pub fn browser(gate: AccessGate, required: Role, surface: BrowserSurface) -> Self {
        Self {
            gate,
            required,
            surface: Surface::Browser(surface),
        }
    }
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to_header_value(location))]).into_response()
}

fn is_ajax(headers: &HeaderMap) -> bool {
    let header_is = |name: &str, value: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case(value))
    };
    header_is("hx-request", "true") || header_is("x-requested-with", "XMLHttpRequest")
}

// ============================================================================
// Middleware
// ============================================================================

/// Reject the request unless it carries a valid credential with the required role
pub async fn require_role(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let credential = locate_credential(req.headers(), state.surface.cookie_name());

    match state.gate.authorize(credential.as_deref(), state.required) {
        Ok(context) => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(rejection) => match &state.surface {
            Surface::Api { .. } => AuthError::from(rejection).into_response(),
            Surface::Browser(browser) => {
                let target = req
                    .uri()
                    .path_and_query()
                    .map_or_else(|| req.uri().path(), |pq| pq.as_str());
                browser.reject(req.headers(), target, rejection)
            }
        },
    }
}

/// Attach the identity when there is a valid one, continue either way.
///
/// An invalid credential on a browser surface has its cookies cleared.
pub async fn optional_auth(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let credential = locate_credential(req.headers(), state.surface.cookie_name());

    let mut stale = false;
    let context = match state.gate.authenticate(credential.as_deref()) {
        Ok(context) => Some(context),
        Err(GateRejection::MissingCredentials) => None,
        Err(rejection) => {
            tracing::debug!(?rejection, "Ignoring invalid optional credential");
            stale = true;
            None
        }
    };

    if let Some(context) = &context {
        req.extensions_mut().insert(context.clone());
    }
    req.extensions_mut().insert(MaybeAccount(context));

    let mut response = next.run(req).await;

    if stale {
        if let Surface::Browser(browser) = &state.surface {
            browser.clear_cookies(&mut response);
        }
    }

    response
}

// ============================================================================
// Extractors
// ============================================================================

/// The authenticated caller; 401 when no gate ran
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentAccount)
            .ok_or_else(|| AuthError::MissingCredentials("unauthorized".into()))
    }
}

/// The caller if authenticated
#[derive(Debug, Clone, Default)]
pub struct MaybeAccount(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for MaybeAccount
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<MaybeAccount>()
            .cloned()
            .unwrap_or_else(|| MaybeAccount(parts.extensions.get::<AuthContext>().cloned())))
    }
}
