//! Supabase Identity Provider
//!
//! Talks to the GoTrue REST API exposed under `{url}/auth/v1`.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::domain::provider::{IdentityProvider, ProviderAccount, ProviderError};

pub const PROVIDER_NAME: &str = "supabase";

/// Supabase (GoTrue) backed identity provider
#[derive(Clone)]
pub struct SupabaseProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SupabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Signup answers with the user itself, or with a session wrapping it
/// when email confirmation is disabled.
#[derive(Debug, Deserialize)]
struct SignupBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    user: Option<UserBody>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl SupabaseProvider {
    pub fn new(client: Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
        builder.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ProviderError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ProviderError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Classify a non-success answer
fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let detail = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .unwrap_or_else(|| status.to_string());

    if status.is_server_error() {
        ProviderError::Unavailable(detail)
    } else {
        ProviderError::Rejected(detail)
    }
}

fn signup_id(body: SignupBody) -> Result<String, ProviderError> {
    body.user
        .map(|u| u.id)
        .or(body.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("no user id in signup response".into()))
}

/// The user id when present, otherwise the access token as opaque proof
fn login_id(body: TokenBody) -> Result<String, ProviderError> {
    body.user
        .map(|u| u.id)
        .filter(|id| !id.is_empty())
        .or(body.access_token.filter(|t| !t.is_empty()))
        .ok_or_else(|| ProviderError::InvalidResponse("no access token in login response".into()))
}

impl IdentityProvider for SupabaseProvider {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn register_user(&self, email: &str, password: &str) -> Result<String, ProviderError> {
        let request = self
            .authorized(self.client.post(self.endpoint("/signup")), &self.api_key)
            .json(&json!({ "email": email, "password": password }));

        let body: SignupBody = Self::json(Self::send(request).await?).await?;
        signup_id(body)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ProviderError> {
        let request = self
            .authorized(
                self.client.post(self.endpoint("/token?grant_type=password")),
                &self.api_key,
            )
            .json(&json!({ "email": email, "password": password }));

        let body: TokenBody = Self::json(Self::send(request).await?).await?;
        login_id(body)
    }

    async fn validate_token(&self, token: &str) -> Result<ProviderAccount, ProviderError> {
        let request = self.authorized(self.client.get(self.endpoint("/user")), token);

        let user: UserBody = Self::json(Self::send(request).await?).await?;
        Ok(ProviderAccount {
            id: user.id,
            email: user.email.unwrap_or_default(),
        })
    }

    async fn delete_user(&self, external_id: &str) -> Result<(), ProviderError> {
        let request = self.authorized(
            self.client
                .delete(self.endpoint(&format!("/admin/users/{}", external_id))),
            &self.api_key,
        );

        Self::send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = SupabaseProvider::new(Client::new(), "https://x.supabase.co/", "key");
        assert_eq!(provider.endpoint("/signup"), "https://x.supabase.co/auth/v1/signup");
        assert_eq!(provider.provider_name(), "supabase");
    }

    #[test]
    fn test_signup_id_shapes() {
        let body: SignupBody = serde_json::from_str(r#"{"id":"u-1","email":"a@b.com"}"#).unwrap();
        assert_eq!(signup_id(body).unwrap(), "u-1");

        let body: SignupBody =
            serde_json::from_str(r#"{"access_token":"t","user":{"id":"u-2"}}"#).unwrap();
        assert_eq!(signup_id(body).unwrap(), "u-2");

        let body: SignupBody = serde_json::from_str(r#"{"id":""}"#).unwrap();
        assert!(matches!(signup_id(body), Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_login_id_prefers_user_id() {
        let body: TokenBody =
            serde_json::from_str(r#"{"access_token":"t","user":{"id":"u-1"}}"#).unwrap();
        assert_eq!(login_id(body).unwrap(), "u-1");

        let body: TokenBody = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();
        assert_eq!(login_id(body).unwrap(), "t");

        let body: TokenBody = serde_json::from_str("{}").unwrap();
        assert!(login_id(body).is_err());
    }

    #[test]
    fn test_status_error_classification() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err, ProviderError::Rejected("Invalid login credentials".into()));

        let err = status_error(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
