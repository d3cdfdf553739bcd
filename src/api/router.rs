//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Each route group carries the guard for its role:
//!
//! | group                      | guard                  |
//! |----------------------------|------------------------|
//! | `/health`, `/auth/*-login` | none (logins rate-limited) |
//! | `/auth/me`                 | `require_auth`         |
//! | `/patients`, `/receptionist` | `require_receptionist` |
//! | `/doctors/*`               | `require_doctor`       |
//! | `/patient/*`               | `require_patient`      |

use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()`:
/// the login rate limit keys on the peer address.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Guard → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access));

    let logins = Router::new()
        .route(
            "/auth/receptionist-login",
            post(endpoints::auth::receptionist_login),
        )
        .route("/auth/doctor-login", post(endpoints::auth::doctor_login))
        .route("/auth/patient-login", post(endpoints::auth::patient_login))
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::rate::limit_login))
        .layer(axum::Extension(ctx.clone()));

    let any_authenticated = Router::new()
        .route("/auth/me", get(endpoints::auth::me))
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let receptionist = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::register),
        )
        .route("/patients/:id", put(endpoints::patients::update))
        .route(
            "/patients/:id/password",
            put(endpoints::patients::change_password),
        )
        .route("/receptionist", get(endpoints::receptionist::profile))
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::auth::require_receptionist))
        .layer(axum::Extension(ctx.clone()));

    let doctor = Router::new()
        .route("/doctors/profile", get(endpoints::doctors::profile))
        .route("/doctors/patients", get(endpoints::doctors::patients))
        .route(
            "/doctors/add-prescription",
            post(endpoints::doctors::add_prescription),
        )
        .route(
            "/doctors/patient/:id/prescriptions",
            get(endpoints::doctors::patient_prescriptions),
        )
        .route(
            "/doctors/prescription/:id",
            put(endpoints::doctors::update_prescription),
        )
        .route("/doctors/add-visit", post(endpoints::doctors::add_visit))
        .route(
            "/doctors/upcoming-visits",
            get(endpoints::doctors::upcoming_visits),
        )
        .route(
            "/doctors/visit/:id",
            put(endpoints::doctors::update_visit).delete(endpoints::doctors::delete_visit),
        )
        .route(
            "/doctors/patient/:id/visits",
            get(endpoints::doctors::patient_visits),
        )
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::auth::require_doctor))
        .layer(axum::Extension(ctx.clone()));

    let patient = Router::new()
        .route("/patient/profile", get(endpoints::patient::profile))
        .route(
            "/patient/prescriptions",
            get(endpoints::patient::prescriptions),
        )
        .route("/patient/visits", get(endpoints::patient::visits))
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::auth::require_patient))
        .layer(axum::Extension(ctx.clone()));

    let api = public
        .merge(logins)
        .merge(any_authenticated)
        .merge(receptionist)
        .merge(doctor)
        .merge(patient);

    let router = Router::new().nest("/api", api);
    if ctx.core.config.cors_any_origin {
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
