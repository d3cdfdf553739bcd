//! HTTP API.
//!
//! Routes are nested under `/api/`. Public routes (health, logins) sit
//! behind a per-client rate limit; every other route sits behind a
//! role guard: Guard → Audit → Handler.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod input;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::ApiServer;
pub use types::ApiContext;
