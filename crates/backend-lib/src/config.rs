// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management and startup validation.
use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Minimum acceptable signing secret length in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Well-known placeholder secrets that must never reach production
const DEFAULT_SECRETS: &[&str] = &[
    "your-jwt-secret-key-change-this-in-production",
    "your-secret-key-change-this-in-production",
    "dev-jwt-secret-key-please-change",
    "secret",
    "changeme",
    "",
];

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Confidential token signing secret (>= 32 bytes, non-default)
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub token_expiration_hours: i64,
    /// Account lockout parameters
    pub lockout: LockoutSettings,
    /// Per-IP request rate limiting
    pub rate_limit: RateLimitSettings,
    /// Append-only security audit log destination
    pub audit_log_path: PathBuf,
    /// Allowed CORS origins for the frontend
    pub frontend_origins: Vec<String>,
}

/// Account lockout parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockoutSettings {
    /// Failed attempts within the window before the account locks
    pub max_attempts: u32,
    /// Sliding window length in minutes
    pub window_minutes: u64,
}

/// Per-IP request rate limiting parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".parse().unwrap(),
            log_level: "info".to_string(),
            jwt_secret: "dev-jwt-secret-key-please-change".to_string(),
            token_expiration_hours: 24,
            lockout: LockoutSettings::default(),
            rate_limit: RateLimitSettings::default(),
            audit_log_path: PathBuf::from("logs/security_audit.log"),
            frontend_origins: vec!["http://localhost:8080".to_string()],
        }
    }
}

impl Default for LockoutSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_minutes: 15,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from `config/default.toml` (if present) merged with
    /// `MONEYMINDER_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from("config/default")
    }

    /// Load settings from an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("MONEYMINDER").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validate security-relevant settings. Run once at startup; a failure
    /// here is a configuration error and the process must not serve traffic.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            bail!(
                "jwt_secret must be at least {} bytes (current: {})",
                MIN_JWT_SECRET_LENGTH,
                self.jwt_secret.len()
            );
        }
        if DEFAULT_SECRETS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&self.jwt_secret))
        {
            bail!("jwt_secret must be changed from its default value");
        }
        if self.token_expiration_hours <= 0 {
            bail!("token_expiration_hours must be positive");
        }
        if self.lockout.max_attempts == 0 || self.lockout.window_minutes == 0 {
            bail!("lockout.max_attempts and lockout.window_minutes must be positive");
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            bail!("rate_limit.max_requests and rate_limit.window_secs must be positive");
        }
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {},
            other => bail!("unknown log_level: {other}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            jwt_secret: "a".repeat(64),
            ..Settings::default()
        }
    }

    #[test]
    fn test_default_settings_use_placeholder_secret() {
        // Defaults are for local development only and must fail validation.
        let settings = Settings::default();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_validation() {
        assert!(valid_settings().validate().is_ok());

        let mut short_secret = valid_settings();
        short_secret.jwt_secret = "too-short".to_string();
        assert!(short_secret.validate().is_err());

        // A 32+ byte secret that is still a known placeholder is rejected
        let mut placeholder = valid_settings();
        placeholder.jwt_secret = "your-jwt-secret-key-change-this-in-production".to_string();
        assert!(placeholder.validate().is_err());

        let mut bad_expiry = valid_settings();
        bad_expiry.token_expiration_hours = 0;
        assert!(bad_expiry.validate().is_err());

        let mut bad_lockout = valid_settings();
        bad_lockout.lockout.max_attempts = 0;
        assert!(bad_lockout.validate().is_err());

        let mut bad_rate_limit = valid_settings();
        bad_rate_limit.rate_limit.window_secs = 0;
        assert!(bad_rate_limit.validate().is_err());

        let mut bad_log_level = valid_settings();
        bad_log_level.log_level = "loud".to_string();
        assert!(bad_log_level.validate().is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
            bind_addr = "127.0.0.1:9000"
            log_level = "debug"
            token_expiration_hours = 12

            [lockout]
            max_attempts = 3
            window_minutes = 5
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(config_path.to_str().unwrap()).unwrap();
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.token_expiration_hours, 12);
        assert_eq!(settings.lockout.max_attempts, 3);
        assert_eq!(settings.lockout.window_minutes, 5);
        // Unspecified sections fall back to defaults
        assert_eq!(settings.rate_limit.max_requests, 100);
    }
}
