use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db;
use crate::error::ServiceError;
use crate::models::*;

pub const VISIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` visit date, rejecting anything else.
pub fn parse_visit_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ServiceError::Validation("Visit date is required".into()));
    }
    // chrono accepts unpadded fields; a strict length check keeps the
    // stored text sortable.
    if raw.len() != 10 {
        return Err(invalid_date());
    }
    NaiveDate::parse_from_str(raw, VISIT_DATE_FORMAT).map_err(|_| invalid_date())
}

fn invalid_date() -> ServiceError {
    ServiceError::Validation("Visit date must be in YYYY-MM-DD format".into())
}

pub fn schedule_visit(
    conn: &Connection,
    doctor_id: i64,
    visit: &NewVisit,
) -> Result<i64, ServiceError> {
    if visit.patient_id <= 0 {
        return Err(ServiceError::Validation("Patient ID is required".into()));
    }
    if !db::patient_exists(conn, visit.patient_id)? {
        return Err(ServiceError::NotFound("Patient not found".into()));
    }
    let visit_id = db::insert_visit(conn, doctor_id, visit.patient_id, visit.visit_date)?;
    tracing::info!(visit_id, doctor_id, patient_id = visit.patient_id, "Visit scheduled");
    Ok(visit_id)
}

pub fn list_upcoming_visits(
    conn: &Connection,
    doctor_id: i64,
    today: NaiveDate,
) -> Result<Vec<UpcomingVisit>, ServiceError> {
    Ok(db::fetch_upcoming_visits_for_doctor(conn, doctor_id, today)?)
}

/// Only the doctor who owns the visit may move it.
pub fn reschedule_visit(
    conn: &Connection,
    visit_id: i64,
    doctor_id: i64,
    new_date: NaiveDate,
) -> Result<(), ServiceError> {
    if db::find_visit_for_doctor(conn, visit_id, doctor_id)?.is_none() {
        return Err(ServiceError::NotFound(
            "Visit not found or not authorized".into(),
        ));
    }
    db::update_visit_date(conn, visit_id, doctor_id, new_date)?;
    tracing::info!(visit_id, doctor_id, %new_date, "Visit rescheduled");
    Ok(())
}

/// Delete by id. Succeeds whether or not the visit existed.
pub fn cancel_visit(conn: &Connection, visit_id: i64) -> Result<(), ServiceError> {
    let removed = db::delete_visit(conn, visit_id)?;
    tracing::info!(visit_id, removed, "Visit cancelled");
    Ok(())
}

pub fn list_patient_visits(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<VisitDate>, ServiceError> {
    Ok(db::fetch_visits_for_patient(conn, patient_id)?)
}

pub fn next_visit_for_patient(
    conn: &Connection,
    patient_id: i64,
    today: NaiveDate,
) -> Result<Option<NextVisit>, ServiceError> {
    Ok(db::fetch_next_visit_for_patient(conn, patient_id, today)?)
}
