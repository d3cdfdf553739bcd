//! Patient self-service: the signed-in patient's own records.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::clinical;
use crate::credentials;
use crate::crypto::Identity;
use crate::models::{NextVisit, Patient, PatientPrescription};

/// `GET /api/patient/profile`
pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Patient>, ApiError> {
    let patient = ctx
        .with_db(move |conn, _| credentials::patient_profile(conn, identity.id))
        .await?;
    Ok(Json(patient))
}

#[derive(Serialize)]
pub struct PrescriptionsResponse {
    pub prescriptions: Vec<PatientPrescription>,
}

/// `GET /api/patient/prescriptions`
pub async fn prescriptions(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<PrescriptionsResponse>, ApiError> {
    let prescriptions = ctx
        .with_db(move |conn, _| clinical::list_prescriptions_with_doctor(conn, identity.id))
        .await?;
    Ok(Json(PrescriptionsResponse { prescriptions }))
}

#[derive(Serialize)]
pub struct NextVisitResponse {
    pub success: bool,
    #[serde(rename = "upcomingVisit")]
    pub upcoming_visit: Option<NextVisit>,
}

/// `GET /api/patient/visits`: the next scheduled visit, or `null`.
pub async fn visits(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<NextVisitResponse>, ApiError> {
    let today = clinical::today();
    let upcoming_visit = ctx
        .with_db(move |conn, _| clinical::next_visit_for_patient(conn, identity.id, today))
        .await?;
    Ok(Json(NextVisitResponse {
        success: true,
        upcoming_visit,
    }))
}
