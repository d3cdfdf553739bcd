//! Receptionist patient management.
//!
//! - `GET /api/patients`: list all patients
//! - `POST /api/patients`: register, returns the QR login card
//! - `PUT /api/patients/:id`: replace profile fields
//! - `PUT /api/patients/:id/password`: change password

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::Ack;
use crate::api::error::ApiError;
use crate::api::input::{parse_id, ApiJson, ChangePasswordRequest, PatientRequest};
use crate::api::types::ApiContext;
use crate::credentials;
use crate::models::Patient;

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = ctx
        .with_db(|conn, _| credentials::list_patients(conn))
        .await?;
    Ok(Json(patients))
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(rename = "patientId")]
    pub patient_id: i64,
    pub qr_code: String,
}

pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<PatientRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let patient = body.into_new_patient()?;
    let registered = ctx
        .with_db(move |conn, core| {
            credentials::register_patient(conn, &patient, core.public_host(), core.password_cost())
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Patient registered successfully",
            patient_id: registered.patient_id,
            qr_code: registered.qr_code,
        }),
    ))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PatientRequest>,
) -> Result<Json<Ack>, ApiError> {
    let patient_id = parse_id(&id)?;
    let profile = body.into_profile()?;
    ctx.with_db(move |conn, _| credentials::update_patient_profile(conn, patient_id, &profile))
        .await?;
    Ok(Json(Ack::ok("Patient updated successfully!")))
}

pub async fn change_password(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Ack>, ApiError> {
    let patient_id = parse_id(&id)?;
    ctx.with_db(move |conn, core| {
        credentials::change_patient_password(
            conn,
            patient_id,
            &body.current_password,
            &body.new_password,
            core.password_cost(),
        )
    })
    .await?;
    Ok(Json(Ack::ok("Password updated successfully")))
}
