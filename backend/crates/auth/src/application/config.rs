//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::collections::BTreeMap;
use std::time::Duration;

/// Re-export cookie settings from platform
pub use platform::cookie::{CookieConfig, SameSite};

/// Secret used when none is configured; refused outside development
pub const DEV_SECRET: &str = "dev-secret-change-me";

/// Lifetime applied when the configured one cannot be parsed
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 3600);

/// Longest accepted token lifetime; anything above falls back to the default
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(366 * 24 * 3600);

/// Tokens with less than this left are re-issued on refresh
pub const REFRESH_THRESHOLD: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Connection settings for one identity provider, keyed by provider name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSettings {
    Supabase { url: String, api_key: String },
}

impl ProviderSettings {
    /// Provider name this variant implements
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderSettings::Supabase { .. } => "supabase",
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// `iss` claim
    pub jwt_issuer: String,
    pub token_lifetime: Duration,
    pub refresh_threshold: Duration,
    /// Provider used when a request names none
    pub default_provider: String,
    pub providers: BTreeMap<String, ProviderSettings>,
    /// Browser session cookie (`token`)
    pub web_cookie: CookieConfig,
    /// Admin panel cookie (`admin_token`)
    pub admin_cookie: CookieConfig,
    pub login_path: String,
    pub register_path: String,
    pub admin_login_path: String,
    /// Where browsers land after a role check fails
    pub access_denied_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let web_cookie = CookieConfig {
            max_age_secs: Some(DEFAULT_TOKEN_LIFETIME.as_secs() as i64),
            ..CookieConfig::default()
        };

        Self {
            jwt_secret: DEV_SECRET.to_string(),
            jwt_issuer: "auth".to_string(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            refresh_threshold: REFRESH_THRESHOLD,
            default_provider: "supabase".to_string(),
            providers: BTreeMap::new(),
            admin_cookie: web_cookie.named("admin_token"),
            web_cookie,
            login_path: "/login".to_string(),
            register_path: "/register".to_string(),
            admin_login_path: "/admin/login".to_string(),
            access_denied_path: "/dashboard".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookies)
    pub fn development() -> Self {
        let mut config = Self::default();
        config.web_cookie.secure = false;
        config.admin_cookie.secure = false;
        config
    }

    /// Set the token lifetime from a duration string such as `24h` or `1h30m`.
    ///
    /// Unparseable input, or a lifetime over a year, falls back to 24 hours.
    /// Cookie max-age follows the lifetime.
    pub fn with_token_ttl(mut self, ttl: &str) -> Self {
        let lifetime = platform::config::parse_duration_or(ttl, DEFAULT_TOKEN_LIFETIME);
        self.token_lifetime = if lifetime > MAX_TOKEN_LIFETIME {
            tracing::warn!(
                input = ttl,
                max_secs = MAX_TOKEN_LIFETIME.as_secs(),
                "Token lifetime too long, using default"
            );
            DEFAULT_TOKEN_LIFETIME
        } else {
            lifetime
        };
        let max_age = i64::try_from(self.token_lifetime.as_secs()).ok();
        self.web_cookie.max_age_secs = max_age;
        self.admin_cookie.max_age_secs = max_age;
        self
    }

    pub fn with_provider(mut self, name: impl Into<String>, settings: ProviderSettings) -> Self {
        self.providers.insert(name.into(), settings);
        self
    }

    /// Whether the signing secret is still the built-in development value
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_SECRET
    }

    /// Script-readable companions set next to the web session cookie
    pub fn web_companion_cookies(&self) -> Vec<CookieConfig> {
        ["user_id", "user_email", "account_type"]
            .into_iter()
            .map(|name| self.web_cookie.named(name).script_readable())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.web_cookie.name, "token");
        assert_eq!(config.admin_cookie.name, "admin_token");
        assert_eq!(config.token_lifetime, DEFAULT_TOKEN_LIFETIME);
        assert_eq!(config.refresh_threshold, Duration::from_secs(300));
        assert!(config.uses_dev_secret());
        assert!(config.web_cookie.secure);
    }

    #[test]
    fn test_development_cookies_insecure() {
        let config = AuthConfig::development();
        assert!(!config.web_cookie.secure);
        assert!(!config.admin_cookie.secure);
    }

    #[test]
    fn test_token_ttl() {
        let config = AuthConfig::default().with_token_ttl("1h30m");
        assert_eq!(config.token_lifetime, Duration::from_secs(5400));
        assert_eq!(config.web_cookie.max_age_secs, Some(5400));

        let config = AuthConfig::default().with_token_ttl("soon");
        assert_eq!(config.token_lifetime, DEFAULT_TOKEN_LIFETIME);

        let config = AuthConfig::default().with_token_ttl("");
        assert_eq!(config.token_lifetime, DEFAULT_TOKEN_LIFETIME);
    }

    #[test]
    fn test_oversized_token_ttl_falls_back() {
        for ttl in ["18446744073709551h", "100000000000h", "9000h"] {
            let config = AuthConfig::default().with_token_ttl(ttl);
            assert_eq!(config.token_lifetime, DEFAULT_TOKEN_LIFETIME, "{ttl}");
            assert_eq!(config.web_cookie.max_age_secs, Some(24 * 3600));
        }

        let config = AuthConfig::default().with_token_ttl("8000h");
        assert_eq!(config.token_lifetime, Duration::from_secs(8000 * 3600));
    }

    #[test]
    fn test_companion_cookies_script_readable() {
        let cookies = AuthConfig::default().web_companion_cookies();
        assert_eq!(cookies.len(), 3);
        assert!(cookies.iter().all(|c| !c.http_only));
        assert_eq!(cookies[1].name, "user_email");
    }
}
