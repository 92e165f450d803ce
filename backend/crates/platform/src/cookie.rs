//! Cookie Management Infrastructure
//!
//! Builds `Set-Cookie` values for auth cookies and reads cookies back
//! from request headers.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{Duration, Utc};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    /// Cookie domain; `None` (or "localhost") omits the attribute
    pub domain: Option<String>,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "token".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            domain: None,
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Config for a cookie with the given name and the same attributes
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Same attributes, readable from scripts
    pub fn script_readable(mut self) -> Self {
        self.http_only = false;
        self
    }

    fn effective_domain(&self) -> Option<&str> {
        self.domain
            .as_deref()
            .filter(|d| !d.is_empty() && *d != "localhost")
    }

    fn push_common_attributes(&self, cookie: &mut String) {
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie.push_str(&format!("; Path={}", self.path));
        if let Some(domain) = self.effective_domain() {
            cookie.push_str(&format!("; Domain={}", domain));
        }
    }

    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}", self.name, value);
        self.push_common_attributes(&mut cookie);

        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
            // Max-Age wins over Expires, so an unrepresentable date is just left out
            let expires = Duration::try_seconds(max_age)
                .and_then(|age| Utc::now().checked_add_signed(age));
            if let Some(expires) = expires {
                cookie.push_str(&format!(
                    "; Expires={}",
                    expires.format("%a, %d %b %Y %H:%M:%S GMT")
                ));
            }
        }

        cookie
    }

    /// Build Set-Cookie header for deletion (expired)
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!("{}=", self.name);
        self.push_common_attributes(&mut cookie);
        cookie.push_str("; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        cookie
    }
}

/// Extract a cookie value from headers
///
/// Empty values are treated as absent, which is what a cleared cookie
/// looks like on the next request from some clients.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Convert a built cookie string into a header value
pub fn to_header_value(cookie: &str) -> HeaderValue {
    HeaderValue::from_str(cookie).unwrap_or_else(|_| {
        tracing::warn!("Cookie contained invalid header characters, dropped");
        HeaderValue::from_static("")
    })
}
