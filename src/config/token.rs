use std::env;

use chrono::Duration;
use rand::RngCore;
use tracing::warn;

use super::{current_environment, ConfigError};

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 300;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 86_400;
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 32;
/// Ten years; longer lifetimes are almost certainly a typo.
pub const MAX_TOKEN_TTL_SECS: i64 = 315_360_000;

/// Signing secret and lifetimes for bearer tokens.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        validate_production_config()?;

        Ok(TokenConfig {
            secret: load_jwt_secret(),
            access_ttl: read_ttl("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?,
            refresh_ttl: read_ttl("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS)?,
        })
    }
}

/// In production the signing secret must be explicit, long, and not a placeholder.
pub fn validate_production_config() -> Result<(), ConfigError> {
    if current_environment() != "production" {
        return Ok(());
    }

    let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

    if secret.len() < MIN_PRODUCTION_SECRET_BYTES {
        return Err(ConfigError::InsecureSecret(format!(
            "JWT_SECRET must be at least {} bytes in production",
            MIN_PRODUCTION_SECRET_BYTES
        )));
    }

    let lowered = secret.to_ascii_lowercase();
    if lowered.contains("example") || lowered.contains("changeme") || lowered.contains("default") {
        return Err(ConfigError::InsecureSecret(
            "JWT_SECRET appears to be a default value".to_string(),
        ));
    }

    Ok(())
}

fn read_ttl(key: &'static str, default: i64) -> Result<Duration, ConfigError> {
    let secs = match env::var(key) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(secs) if secs > 0 && secs <= MAX_TOKEN_TTL_SECS => secs,
            _ => return Err(ConfigError::Invalid { key, value: raw }),
        },
        Err(_) => default,
    };

    Duration::try_seconds(secs).ok_or(ConfigError::Invalid {
        key,
        value: secs.to_string(),
    })
}

fn load_jwt_secret() -> Vec<u8> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => {
            warn!("JWT_SECRET not set; generating ephemeral key (development only)");
            let mut bytes = vec![0u8; 64];
            rand::thread_rng().fill_bytes(&mut bytes);
            bytes
        }
    }
}
