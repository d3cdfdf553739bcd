use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::crypto::{MIN_SECRET_LENGTH, PASSWORD_COST};

/// Application-level constants
pub const APP_NAME: &str = "clinic-records";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable prefix, e.g. `CLINIC_JWT_SECRET`.
pub const ENV_PREFIX: &str = "CLINIC";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime settings, loaded once at startup.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    /// Host (and optional port) embedded in patient QR login URLs.
    pub public_host: String,
    pub log_filter: String,
    pub cors_any_origin: bool,
    pub login_rate_per_minute: u32,
    /// Key the login rate limit on `X-Forwarded-For`/`X-Real-IP` instead of
    /// the peer address. Only for deployments behind a reverse proxy.
    pub trust_proxy_headers: bool,
    pub password_cost: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("public_host", &self.public_host)
            .field("log_filter", &self.log_filter)
            .field("cors_any_origin", &self.cors_any_origin)
            .field("login_rate_per_minute", &self.login_rate_per_minute)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("password_cost", &self.password_cost)
            .finish()
    }
}

impl AppConfig {
    /// Load `.env` (if present), then defaults overlaid with `CLINIC_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_environment(env: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("database_path", "clinic.db")?
            .set_default("public_host", "localhost:3000")?
            .set_default("log_filter", default_log_filter())?
            .set_default("cors_any_origin", true)?
            .set_default("login_rate_per_minute", 20)?
            .set_default("trust_proxy_headers", false)?
            .set_default("password_cost", i64::from(PASSWORD_COST))?
            .add_source(env)
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "{ENV_PREFIX}_JWT_SECRET must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if self.public_host.is_empty() || self.public_host.contains("://") {
            return Err(ConfigError::Invalid(
                "public_host must be a bare host, e.g. clinic.example.com".into(),
            ));
        }
        if self.login_rate_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "login_rate_per_minute must be positive".into(),
            ));
        }
        if !(4..=20).contains(&self.password_cost) {
            return Err(ConfigError::Invalid(
                "password_cost must be between 4 and 20".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_log_filter() -> &'static str {
    "info"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    const SECRET: (&str, &str) = ("CLINIC_JWT_SECRET", "0123456789abcdef0123");

    #[test]
    fn defaults_apply_when_only_secret_set() {
        let config = AppConfig::from_environment(env(&[SECRET])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_path, PathBuf::from("clinic.db"));
        assert_eq!(config.public_host, "localhost:3000");
        assert!(config.cors_any_origin);
        assert_eq!(config.login_rate_per_minute, 20);
        assert!(!config.trust_proxy_headers);
        assert_eq!(config.password_cost, 10);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_environment(env(&[
            SECRET,
            ("CLINIC_PORT", "8080"),
            ("CLINIC_PUBLIC_HOST", "clinic.example.com"),
            ("CLINIC_CORS_ANY_ORIGIN", "false"),
            ("CLINIC_TRUST_PROXY_HEADERS", "true"),
        ]))
        .unwrap();
        assert!(config.trust_proxy_headers);
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_host, "clinic.example.com");
        assert!(!config.cors_any_origin);
    }

    #[test]
    fn missing_secret_fails() {
        assert!(matches!(
            AppConfig::from_environment(env(&[])),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn short_secret_fails_validation() {
        let err = AppConfig::from_environment(env(&[("CLINIC_JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("JWT_SECRET")));
    }

    #[test]
    fn public_host_with_scheme_fails_validation() {
        let err = AppConfig::from_environment(env(&[
            SECRET,
            ("CLINIC_PUBLIC_HOST", "https://clinic.example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AppConfig::from_environment(env(&[SECRET])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("0123456789abcdef0123"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
