//! Shared types for the HTTP layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::error::ServiceError;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub login_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        let per_minute = core.config.login_rate_per_minute;
        Self {
            core,
            login_limiter: Arc::new(Mutex::new(RateLimiter::new(per_minute))),
        }
    }

    /// Run `work` against a fresh connection on the blocking pool.
    /// Password hashing and SQLite both block, so every handler goes
    /// through here.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &CoreState) -> Result<T, ServiceError> + Send + 'static,
    {
        let core = self.core.clone();
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let conn = core.open_db()?;
            Ok(work(&conn, &core)?)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

const WINDOW: Duration = Duration::from_secs(60);

/// Per-client sliding-window limiter for the login routes.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
}

impl RateLimiter {
    pub fn new(per_minute: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
        }
    }

    /// Record an attempt. Returns `Err(retry_after_secs)` once the
    /// client has used its budget for the current window.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&mut self, client: &str, now: Instant) -> Result<(), u64> {
        // Periodic cleanup when the table grows large
        if self.windows.len() > 1000 {
            self.windows
                .retain(|_, hits| hits.iter().any(|ts| now.duration_since(*ts) < WINDOW));
        }

        let hits = self.windows.entry(client.to_string()).or_default();
        hits.retain(|ts| now.duration_since(*ts) < WINDOW);

        if hits.len() as u32 >= self.per_minute {
            let oldest = hits.first().copied().unwrap_or(now);
            let wait = WINDOW.saturating_sub(now.duration_since(oldest));
            return Err(wait.as_secs().max(1));
        }

        hits.push(now);
        Ok(())
    }
}
