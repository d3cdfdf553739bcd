//! `GET /api/receptionist`: the signed-in receptionist's own profile.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::credentials;
use crate::crypto::Identity;

#[derive(Serialize)]
pub struct ReceptionistResponse {
    pub name: String,
    pub email: String,
}

pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ReceptionistResponse>, ApiError> {
    let profile = ctx
        .with_db(move |conn, _| credentials::staff_profile(conn, identity))
        .await?;
    Ok(Json(ReceptionistResponse {
        name: profile.name,
        email: profile.email,
    }))
}
