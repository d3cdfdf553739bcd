//! Doctor endpoints: own profile, patient list, prescriptions and visits.
//!
//! Every route here sits behind `require_doctor`; the doctor id always
//! comes from the verified token, never from the request body.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::endpoints::Ack;
use crate::api::error::ApiError;
use crate::api::input::{
    parse_id, AddPrescriptionRequest, AddVisitRequest, ApiJson, ReplaceMedicinesRequest,
    RescheduleVisitRequest,
};
use crate::api::types::ApiContext;
use crate::clinical;
use crate::credentials;
use crate::crypto::Identity;
use crate::models::{Patient, PrescriptionRecord, StaffProfile, UpcomingVisit, VisitDate};

/// `GET /api/doctors/profile`
pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<StaffProfile>, ApiError> {
    let profile = ctx
        .with_db(move |conn, _| credentials::staff_profile(conn, identity))
        .await?;
    Ok(Json(profile))
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub success: bool,
    pub patients: Vec<Patient>,
}

/// `GET /api/doctors/patients`
pub async fn patients(State(ctx): State<ApiContext>) -> Result<Json<PatientsResponse>, ApiError> {
    let patients = ctx
        .with_db(|conn, _| credentials::list_patients(conn))
        .await?;
    Ok(Json(PatientsResponse {
        success: true,
        patients,
    }))
}

// ── Prescriptions ───────────────────────────────────────

#[derive(Serialize)]
pub struct AddPrescriptionResponse {
    pub success: bool,
    pub message: &'static str,
    pub prescription_id: i64,
}

/// `POST /api/doctors/add-prescription`
pub async fn add_prescription(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<AddPrescriptionRequest>,
) -> Result<Json<AddPrescriptionResponse>, ApiError> {
    let prescription = body.into_new_prescription()?;
    let prescription_id = ctx
        .with_db(move |conn, _| clinical::add_prescription(conn, identity.id, &prescription))
        .await?;
    Ok(Json(AddPrescriptionResponse {
        success: true,
        message: "Prescription added successfully!",
        prescription_id,
    }))
}

#[derive(Serialize)]
pub struct PrescriptionsResponse {
    pub success: bool,
    pub prescriptions: Vec<PrescriptionRecord>,
}

/// `GET /api/doctors/patient/:id/prescriptions`
pub async fn patient_prescriptions(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<PrescriptionsResponse>, ApiError> {
    let patient_id = parse_id(&id)?;
    let prescriptions = ctx
        .with_db(move |conn, _| clinical::list_prescriptions_for_patient(conn, patient_id))
        .await?;
    Ok(Json(PrescriptionsResponse {
        success: true,
        prescriptions,
    }))
}

/// `PUT /api/doctors/prescription/:id`: replace the medicine set.
pub async fn update_prescription(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ReplaceMedicinesRequest>,
) -> Result<Json<Ack>, ApiError> {
    let prescription_id = parse_id(&id)?;
    let medicines = body.into_medicines();
    ctx.with_db(move |conn, _| {
        clinical::replace_prescription_medicines(conn, prescription_id, &medicines)
    })
    .await?;
    Ok(Json(Ack::ok("Prescription updated successfully!")))
}

// ── Visits ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct AddVisitResponse {
    pub success: bool,
    pub message: &'static str,
    pub visit_id: i64,
}

/// `POST /api/doctors/add-visit`
pub async fn add_visit(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<AddVisitRequest>,
) -> Result<Json<AddVisitResponse>, ApiError> {
    let visit = body.into_new_visit()?;
    let visit_id = ctx
        .with_db(move |conn, _| clinical::schedule_visit(conn, identity.id, &visit))
        .await?;
    Ok(Json(AddVisitResponse {
        success: true,
        message: "Visit scheduled successfully",
        visit_id,
    }))
}

#[derive(Serialize)]
pub struct UpcomingVisitsResponse {
    pub success: bool,
    pub visits: Vec<UpcomingVisit>,
    pub doctor_id: i64,
}

/// `GET /api/doctors/upcoming-visits`
pub async fn upcoming_visits(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UpcomingVisitsResponse>, ApiError> {
    let today = clinical::today();
    let visits = ctx
        .with_db(move |conn, _| clinical::list_upcoming_visits(conn, identity.id, today))
        .await?;
    Ok(Json(UpcomingVisitsResponse {
        success: true,
        visits,
        doctor_id: identity.id,
    }))
}

/// `PUT /api/doctors/visit/:id`: move a visit this doctor owns.
pub async fn update_visit(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RescheduleVisitRequest>,
) -> Result<Json<Ack>, ApiError> {
    let visit_id = parse_id(&id)?;
    let new_date = clinical::parse_visit_date(body.visit_date.as_deref().unwrap_or_default())?;
    ctx.with_db(move |conn, _| clinical::reschedule_visit(conn, visit_id, identity.id, new_date))
        .await?;
    Ok(Json(Ack::ok("Visit updated successfully")))
}

/// `DELETE /api/doctors/visit/:id`
pub async fn delete_visit(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    let visit_id = parse_id(&id)?;
    ctx.with_db(move |conn, _| clinical::cancel_visit(conn, visit_id))
        .await?;
    Ok(Json(Ack::ok("Visit deleted successfully!")))
}

/// `GET /api/doctors/patient/:id/visits`
pub async fn patient_visits(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<VisitDate>>, ApiError> {
    let patient_id = parse_id(&id)?;
    let visits = ctx
        .with_db(move |conn, _| clinical::list_patient_visits(conn, patient_id))
        .await?;
    Ok(Json(visits))
}
