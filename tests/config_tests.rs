use std::{collections::HashMap, env};

use eventboard::config::{validate_production_config, AppConfig, ConfigError, TokenConfig};
use serial_test::serial;

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value.into());
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn defaults_apply_in_development() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "development");
    env_guard.set("DATABASE_URL", "sqlite::memory:");
    for key in [
        "HOST",
        "PORT",
        "JWT_SECRET",
        "ACCESS_TOKEN_TTL_SECS",
        "REFRESH_TOKEN_TTL_SECS",
        "CORS_ALLOWED_ORIGIN",
    ] {
        env_guard.remove(key);
    }

    let config = AppConfig::from_env().expect("development config should load");

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8000);
    assert!(config.cors_allowed_origin.is_none());
    assert_eq!(config.token.access_ttl.num_seconds(), 300);
    assert_eq!(config.token.refresh_ttl.num_seconds(), 86_400);
    assert_eq!(config.token.secret.len(), 64, "ephemeral secret expected");
}

#[test]
#[serial]
fn database_url_is_required() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "development");
    env_guard.remove("DATABASE_URL");

    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Missing("DATABASE_URL"))
    ));
}

#[test]
#[serial]
fn invalid_port_and_ttl_are_rejected() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "development");
    env_guard.set("DATABASE_URL", "sqlite::memory:");
    env_guard.set("PORT", "eighty");

    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Invalid { key: "PORT", .. })
    ));

    env_guard.remove("PORT");
    env_guard.set("ACCESS_TOKEN_TTL_SECS", "0");
    assert!(matches!(
        TokenConfig::from_env(),
        Err(ConfigError::Invalid {
            key: "ACCESS_TOKEN_TTL_SECS",
            ..
        })
    ));

    // Lifetimes that would overflow the clock are refused up front
    env_guard.remove("ACCESS_TOKEN_TTL_SECS");
    for huge in ["1000000000000000", "9223372036854775807"] {
        env_guard.set("REFRESH_TOKEN_TTL_SECS", huge);
        assert!(matches!(
            TokenConfig::from_env(),
            Err(ConfigError::Invalid {
                key: "REFRESH_TOKEN_TTL_SECS",
                ..
            })
        ));
    }
}

#[test]
#[serial]
fn explicit_settings_are_read() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "development");
    env_guard.set("DATABASE_URL", "sqlite://data/test.db");
    env_guard.set("HOST", "0.0.0.0");
    env_guard.set("PORT", "9000");
    env_guard.set("JWT_SECRET", "local-secret");
    env_guard.set("ACCESS_TOKEN_TTL_SECS", "60");
    env_guard.remove("REFRESH_TOKEN_TTL_SECS");
    env_guard.set("CORS_ALLOWED_ORIGIN", "https://board.example.org");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9000);
    assert_eq!(config.token.secret, b"local-secret".to_vec());
    assert_eq!(config.token.access_ttl.num_seconds(), 60);
    assert_eq!(
        config.cors_allowed_origin.as_deref(),
        Some("https://board.example.org")
    );
    assert!(!format!("{:?}", config.token).contains("local-secret"));
}

#[test]
#[serial]
fn production_requires_jwt_secret() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "production");
    env_guard.remove("JWT_SECRET");

    assert!(matches!(
        validate_production_config(),
        Err(ConfigError::Missing("JWT_SECRET"))
    ));
}

#[test]
#[serial]
fn production_rejects_weak_secrets() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "production");

    for weak in ["short", "changeme-changeme-changeme-changeme"] {
        env_guard.set("JWT_SECRET", weak);
        assert!(
            matches!(
                validate_production_config(),
                Err(ConfigError::InsecureSecret(_))
            ),
            "{} should be rejected",
            weak
        );
    }

    env_guard.set("JWT_SECRET", "k".repeat(48));
    assert!(validate_production_config().is_ok());
}
