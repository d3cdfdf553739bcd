//! Login endpoints and the caller's own identity.
//!
//! - `POST /api/auth/receptionist-login`
//! - `POST /api/auth/doctor-login`
//! - `POST /api/auth/patient-login`
//! - `GET /api/auth/me`

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::input::ApiJson;
use crate::api::types::ApiContext;
use crate::credentials::{self, LoginCredentials};
use crate::crypto::Identity;
use crate::models::{PatientSummary, Role, StaffSummary};

#[derive(Serialize)]
pub struct StaffLoginResponse {
    pub success: bool,
    pub token: String,
    pub user: StaffSummary,
}

#[derive(Serialize)]
pub struct PatientLoginResponse {
    pub success: bool,
    pub token: String,
    pub patient: PatientSummary,
}

async fn staff_login(
    ctx: ApiContext,
    credentials: LoginCredentials,
    role: Role,
) -> Result<Json<StaffLoginResponse>, ApiError> {
    let (token, user) = ctx
        .with_db(move |conn, core| {
            credentials::authenticate_staff(conn, core.tokens(), &credentials, role)
        })
        .await?;
    Ok(Json(StaffLoginResponse {
        success: true,
        token,
        user,
    }))
}

pub async fn receptionist_login(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<LoginCredentials>,
) -> Result<Json<StaffLoginResponse>, ApiError> {
    staff_login(ctx, body, Role::Receptionist).await
}

pub async fn doctor_login(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<LoginCredentials>,
) -> Result<Json<StaffLoginResponse>, ApiError> {
    staff_login(ctx, body, Role::Doctor).await
}

pub async fn patient_login(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<LoginCredentials>,
) -> Result<Json<PatientLoginResponse>, ApiError> {
    let (token, patient) = ctx
        .with_db(move |conn, core| credentials::authenticate_patient(conn, core.tokens(), &body))
        .await?;
    Ok(Json(PatientLoginResponse {
        success: true,
        token,
        patient,
    }))
}

/// `GET /api/auth/me`: echo the verified token identity.
pub async fn me(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}
