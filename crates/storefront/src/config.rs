//! Storefront configuration loaded from environment variables.
//!
//! Required: `MARKETPLACE_API_URL`, `STOREFRONT_BASE_URL`,
//! `STOREFRONT_SESSION_SECRET` (32+ chars, randomly generated).
//! Optional: `STOREFRONT_HOST` (default 127.0.0.1), `STOREFRONT_PORT`
//! (default 3000), `SENTRY_DSN`, `SENTRY_ENVIRONMENT`.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const SESSION_SECRET_MIN_LEN: usize = 32;

// A hex- or base64-encoded random secret sits well above this; English
// words and keyboard mashing sit below it.
const SESSION_SECRET_MIN_ENTROPY: f64 = 3.3;

/// Substrings that mark a secret as a template leftover rather than a
/// generated value. Matched case-insensitively.
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Everything the storefront binary needs to start.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL, used to decide whether session cookies are Secure.
    pub base_url: String,
    pub session_secret: SecretString,
    pub marketplace: MarketplaceApiConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Connection settings for the marketplace REST backend.
#[derive(Debug, Clone)]
pub struct MarketplaceApiConfig {
    /// Base URL without a trailing slash, e.g. `https://api.devshelf.dev`.
    pub api_url: String,
}

impl StorefrontConfig {
    /// Read configuration from the process environment, loading a `.env`
    /// file first when one exists.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is absent, unparseable, or when the
    /// session secret looks like a placeholder or has too little entropy.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host: IpAddr = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port: u16 = parse_env("STOREFRONT_PORT", "3000")?;

        Ok(Self {
            host,
            port,
            base_url: required_env("STOREFRONT_BASE_URL")?,
            session_secret: load_session_secret("STOREFRONT_SESSION_SECRET")?,
            marketplace: MarketplaceApiConfig::from_env()?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MarketplaceApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = required_env("MARKETPLACE_API_URL")?;
        if !raw.starts_with("http://") && !raw.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETPLACE_API_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }
        Ok(Self {
            // Endpoint paths all begin with a slash, so the base keeps none.
            api_url: raw.trim_end_matches('/').to_string(),
        })
    }
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn load_session_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = required_env(key)?;
    check_session_secret(key, &value)?;
    Ok(SecretString::from(value))
}

/// Reject secrets that would undermine cookie signing: too short, a
/// recognizable template placeholder, or with the character distribution
/// of something typed by hand.
fn check_session_secret(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < SESSION_SECRET_MIN_LEN {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "must be at least {SESSION_SECRET_MIN_LEN} characters (got {})",
                value.len()
            ),
        ));
    }

    let lowered = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lowered.contains(*m)) {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("appears to be a placeholder (contains '{marker}')"),
        ));
    }

    let entropy = bits_per_char(value);
    if entropy < SESSION_SECRET_MIN_ENTROPY {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {SESSION_SECRET_MIN_ENTROPY:.1}); generate one with `openssl rand -hex 32`"
            ),
        ));
    }

    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
fn bits_per_char(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    #[allow(clippy::cast_precision_loss)] // secrets are far shorter than 2^52
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entropy_of_repeated_char_is_zero() {
        assert!(bits_per_char("aaaaaaa").abs() < f64::EPSILON);
        assert!(bits_per_char("").abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_of_even_two_char_mix_is_one_bit() {
        assert!((bits_per_char("abababab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn placeholder_secret_is_rejected() {
        let err = check_session_secret("S", "your-session-key-goes-right-here-ok").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = check_session_secret("S", "too-short").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn low_entropy_secret_is_rejected() {
        let err = check_session_secret("S", &"ab".repeat(20)).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn random_looking_secret_is_accepted() {
        assert!(check_session_secret("S", "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%dF8(").is_ok());
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let config = StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            marketplace: MarketplaceApiConfig {
                api_url: "http://localhost:8000".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }
}
