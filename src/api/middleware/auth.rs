//! Bearer token access guards.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it with the
//! `TokenService`, checks the role the route requires, and injects the
//! caller's `Identity` into request extensions for downstream handlers.

use axum::http::{header, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::crypto::Identity;
use crate::models::Role;

/// Any authenticated caller.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, None).await
}

pub async fn require_receptionist(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, Some(Role::Receptionist)).await
}

pub async fn require_doctor(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, Some(Role::Doctor)).await
}

pub async fn require_patient(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, Some(Role::Patient)).await
}

async fn guard(req: Request<axum::body::Body>, next: Next, required: Option<Role>) -> Response {
    match guard_inner(req, next, required).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn guard_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
    required: Option<Role>,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract bearer token
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;

    // 2. Verify signature and expiry
    let identity: Identity = ctx.core.tokens().verify(token)?;

    // 3. Role check
    if let Some(role) = required {
        if identity.role != role {
            tracing::warn!(
                required = %role,
                actual = %identity.role,
                id = identity.id,
                path = req.uri().path(),
                "Role mismatch"
            );
            return Err(ApiError::Forbidden);
        }
    }

    // 4. Inject identity for downstream handlers
    req.extensions_mut().insert(identity);

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}

fn bearer_token(req: &Request<axum::body::Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
