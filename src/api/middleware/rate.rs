//! Per-client rate limiting for the public login routes.
//!
//! Login verifies a deliberately slow password hash, so bursts are cut
//! off before they reach the blocking pool. Clients are keyed by peer IP
//! (`ConnectInfo<SocketAddr>`, so the server must be run with
//! `into_make_service_with_connect_info`). Forwarding headers are only
//! honoured when `trust_proxy_headers` is set.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

fn forwarded_client(req: &Request<axum::body::Body>) -> Option<String> {
    let headers = req.headers();
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("X-Real-IP").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Client key: peer IP, or the first forwarded hop when proxy headers
/// are trusted. `None` when the connection carries no peer address.
fn rate_key(req: &Request<axum::body::Body>, trust_proxy_headers: bool) -> Option<String> {
    if trust_proxy_headers {
        if let Some(client) = forwarded_client(req) {
            return Some(format!("ip:{client}"));
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
}

/// Returns 429 once the client exceeds its per-minute budget.
pub async fn limit_login(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&req, ctx.core.config.trust_proxy_headers)
        .ok_or(ApiError::Internal("missing peer address".into()))?;

    // MutexGuard is !Send; drop it before .await via block scope
    {
        let mut limiter = ctx
            .login_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter.check(&key).map_err(|retry_after| {
            tracing::warn!(client = %key, "Login rate limit exceeded");
            ApiError::RateLimited { retry_after }
        })?;
    }

    Ok(next.run(req).await)
}
