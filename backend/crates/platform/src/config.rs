//! Configuration helpers
//!
//! Environment lookups with defaults, and compact duration strings
//! (`24h`, `90m`, `1h30m`, `45s`, `500ms`).

use std::env;
use std::time::Duration;

/// Error when parsing a duration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration: {0}")]
    Invalid(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
}

/// Parse a duration made of `<number><unit>` segments
///
/// Supported units: `h`, `m`, `s`, `ms`. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = s;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| DurationParseError::Invalid(s.to_string()))?;
        if digits == 0 {
            return Err(DurationParseError::Invalid(s.to_string()));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| DurationParseError::Invalid(s.to_string()))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let overflow = || DurationParseError::Invalid(s.to_string());
        let segment = match unit {
            "h" => Duration::from_secs(value.checked_mul(3600).ok_or_else(overflow)?),
            "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(overflow)?),
            "s" => Duration::from_secs(value),
            "ms" => Duration::from_millis(value),
            _ => {
                return Err(DurationParseError::UnknownUnit {
                    unit: unit.to_string(),
                    input: s.to_string(),
                });
            }
        };
        total = total.checked_add(segment).ok_or_else(overflow)?;
    }

    Ok(total)
}

/// Parse a duration, falling back to `default` on any error
pub fn parse_duration_or(input: &str, default: Duration) -> Duration {
    match parse_duration(input) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(
                input = input,
                error = %e,
                default_secs = default.as_secs(),
                "Unparseable duration, using default"
            );
            default
        }
    }
}

/// Read an environment variable, using `default` when unset or empty
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read an optional environment variable (unset or empty is `None`)
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read a boolean environment variable (`true`/`1`/`yes`, case-insensitive)
pub fn env_flag(key: &str, default: bool) -> bool {
    match env_opt(key) {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        None => default,
    }
}
