//! Bearer credential parsing
//!
//! `Authorization: Bearer <token>` extraction for API surfaces.

use axum::http::{HeaderMap, header};

/// Error when reading the Authorization header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("missing authorization header")]
    Missing,
    #[error("invalid authorization header format")]
    Malformed,
}

/// Parse an Authorization header value
///
/// The value must be exactly two space-separated parts and the scheme
/// is matched case-insensitively.
pub fn parse_bearer(value: &str) -> Result<&str, BearerError> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(BearerError::Malformed),
    }
}

/// Extract a bearer token from request headers
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    if value.is_empty() {
        return Err(BearerError::Missing);
    }

    parse_bearer(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_bearer_case_insensitive() {
        assert_eq!(parse_bearer("Bearer abc"), Ok("abc"));
        assert_eq!(parse_bearer("bearer abc"), Ok("abc"));
        assert_eq!(parse_bearer("BEARER abc"), Ok("abc"));
    }

    #[test]
    fn test_parse_bearer_rejects_bad_shapes() {
        assert_eq!(parse_bearer("Bearer"), Err(BearerError::Malformed));
        assert_eq!(parse_bearer("Basic abc"), Err(BearerError::Malformed));
        assert_eq!(parse_bearer("Bearer a b"), Err(BearerError::Malformed));
        assert_eq!(parse_bearer("Bearer  abc"), Err(BearerError::Malformed));
    }

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), Err(BearerError::Missing));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_bearer(&headers), Ok("tok".to_string()));
    }
}
