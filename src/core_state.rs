//! Shared application state.
//!
//! Built once at startup and wrapped in `Arc`; everything inside is
//! immutable, so handlers share it without locks. Database access opens
//! one connection per call.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AppConfig;
use crate::crypto::{TokenError, TokenService};
use crate::db;

pub struct CoreState {
    pub config: AppConfig,
    tokens: TokenService,
    db_path: PathBuf,
}

impl CoreState {
    /// Build the state and bring the database schema up to date.
    pub fn initialize(config: AppConfig) -> Result<Self, CoreError> {
        config
            .validate()
            .map_err(|e| CoreError::Config(e.to_string()))?;
        let tokens = TokenService::new(&config.jwt_secret)?;
        let db_path = config.database_path.clone();

        // Applies pending migrations; the connection itself is not kept.
        db::open_database(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database ready");

        Ok(Self {
            config,
            tokens,
            db_path,
        })
    }

    /// Open a database connection. Schema is already migrated.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::connect(&self.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn public_host(&self) -> &str {
        &self.config.public_host
    }

    pub fn password_cost(&self) -> u32 {
        self.config.password_cost
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Token service error: {0}")]
    Token(#[from] TokenError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: dir.join("clinic.db"),
            jwt_secret: "core-state-test-secret".into(),
            public_host: "clinic.example.com".into(),
            log_filter: "info".into(),
            cors_any_origin: true,
            login_rate_per_minute: 20,
            trust_proxy_headers: false,
            password_cost: 4,
        }
    }

    #[test]
    fn initialize_creates_migrated_database() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::initialize(config(dir.path())).unwrap();
        assert!(state.db_path().exists());

        let conn = state.open_db().unwrap();
        assert_eq!(db::get_current_version(&conn), 1);
    }

    #[test]
    fn initialize_rejects_weak_secret() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.jwt_secret = "weak".into();
        assert!(matches!(
            CoreState::initialize(cfg),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn tokens_round_trip_through_state() {
        use crate::crypto::Identity;
        use crate::models::Role;

        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::initialize(config(dir.path())).unwrap();
        let identity = Identity { id: 3, role: Role::Receptionist };
        let token = state.tokens().issue(identity).unwrap();
        assert_eq!(state.tokens().verify(&token).unwrap(), identity);
    }
}
