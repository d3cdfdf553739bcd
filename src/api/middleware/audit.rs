//! Access logging middleware.
//!
//! Logs every API request with method, path, response status and, when
//! the access guard ran first, the caller's role and id.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::crypto::Identity;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let identity = req.extensions().get::<Identity>().copied();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    match identity {
        Some(who) => tracing::info!(
            %method,
            path = %path,
            status,
            role = %who.role,
            id = who.id,
            "API access"
        ),
        None => tracing::info!(%method, path = %path, status, "API access"),
    }

    response
}
