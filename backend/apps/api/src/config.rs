//! Server Configuration
//!
//! Reads the process environment (after `.env` is loaded) into the
//! server settings and the auth crate's `AuthConfig`.

use std::net::SocketAddr;

use auth::{AuthConfig, ProviderSettings};
use platform::config::{env_flag, env_opt, env_or};

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Process-level settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: String,
    pub database_url: String,
    pub address: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = env_or("ENVIRONMENT", "development");
        let is_development = environment == "development";

        let database_url = env_opt("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

        let address: SocketAddr = env_or("API_ADDRESS", "0.0.0.0:8000")
            .parse()
            .map_err(|e| anyhow::anyhow!("API_ADDRESS is not a socket address: {}", e))?;

        let frontend_origins = env_or("FRONTEND_ORIGINS", DEFAULT_FRONTEND_ORIGINS)
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let base = if is_development {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };

        let mut auth = AuthConfig {
            jwt_secret: env_or("AUTH_SECRET_KEY", auth::application::config::DEV_SECRET),
            jwt_issuer: env_or("AUTH_ISSUER", "api"),
            default_provider: env_or("AUTH_PROVIDER", "supabase"),
            ..base
        }
        .with_token_ttl(&env_or("AUTH_TOKEN_TTL", "24h"));

        if let (Some(url), Some(api_key)) = (env_opt("SUPABASE_URL"), env_opt("SUPABASE_API_KEY")) {
            auth = auth.with_provider("supabase", ProviderSettings::Supabase { url, api_key });
        }

        let secure = env_flag("COOKIE_SECURE", !is_development);
        auth.web_cookie.secure = secure;
        auth.admin_cookie.secure = secure;
        if let Some(domain) = env_opt("COOKIE_DOMAIN") {
            auth.web_cookie.domain = Some(domain.clone());
            auth.admin_cookie.domain = Some(domain);
        }

        if auth.uses_dev_secret() && !is_development {
            anyhow::bail!("AUTH_SECRET_KEY must be set outside development");
        }

        Ok(Self {
            environment,
            database_url,
            address,
            frontend_origins,
            auth,
        })
    }
}
