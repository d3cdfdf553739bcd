pub mod api;
pub mod clinical; // prescriptions + visits
pub mod config;
pub mod core_state;
pub mod credentials;
pub mod crypto;
pub mod db;
pub mod error;
pub mod models;
pub mod qr;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `fallback` (from configuration).
pub fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    // A subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
