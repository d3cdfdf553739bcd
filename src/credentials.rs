//! Credential store: staff and patient authentication, patient
//! registration with a QR login card, profile and password maintenance.

use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::crypto::{hash_password, verify_password, Identity, TokenService};
use crate::db::{self, DatabaseError};
use crate::error::ServiceError;
use crate::models::*;
use crate::qr;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginCredentials {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewStaff {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: Role,
}

/// Unknown email and wrong password collapse into the same error.
pub fn authenticate_staff(
    conn: &Connection,
    tokens: &TokenService,
    credentials: &LoginCredentials,
    role: Role,
) -> Result<(String, StaffSummary), ServiceError> {
    credentials.validate()?;
    if !role.is_staff() {
        return Err(ServiceError::Validation(format!("{role} is not a staff role")));
    }

    let Some(user) = db::find_staff_by_email_and_role(conn, &credentials.email, role)? else {
        tracing::warn!(role = %role, "Login rejected: unknown account");
        return Err(ServiceError::InvalidCredentials);
    };
    if !verify_password(&credentials.password, &user.password_hash)? {
        tracing::warn!(role = %role, user_id = user.id, "Login rejected: wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    let token = tokens.issue(Identity { id: user.id, role: user.role })?;
    tracing::info!(role = %role, user_id = user.id, "Staff login");
    Ok((token, user.summary()))
}

pub fn authenticate_patient(
    conn: &Connection,
    tokens: &TokenService,
    credentials: &LoginCredentials,
) -> Result<(String, PatientSummary), ServiceError> {
    credentials.validate()?;

    let Some(patient) = db::find_patient_credentials_by_email(conn, &credentials.email)? else {
        tracing::warn!("Patient login rejected: unknown account");
        return Err(ServiceError::InvalidCredentials);
    };
    if !verify_password(&credentials.password, &patient.password_hash)? {
        tracing::warn!(patient_id = patient.id, "Patient login rejected: wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    let token = tokens.issue(Identity { id: patient.id, role: Role::Patient })?;
    tracing::info!(patient_id = patient.id, "Patient login");
    Ok((
        token,
        PatientSummary {
            id: patient.id,
            email: patient.email,
        },
    ))
}

/// Insert the patient, derive the QR login card from the new id and store
/// it. All three steps commit together or not at all.
pub fn register_patient(
    conn: &Connection,
    patient: &NewPatient,
    public_host: &str,
    password_cost: u32,
) -> Result<RegisteredPatient, ServiceError> {
    patient.validate()?;
    let password_hash = hash_password(&patient.password, password_cost)?;

    let tx = conn.unchecked_transaction()?;
    let patient_id = db::insert_patient(&tx, patient, &password_hash).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => {
            ServiceError::Conflict("A patient with this email already exists".into())
        }
        other => ServiceError::Database(other),
    })?;
    let qr_code = qr::patient_qr_code(public_host, &patient.email, patient_id)?;
    db::set_patient_qr_code(&tx, patient_id, &qr_code)?;
    tx.commit()?;

    tracing::info!(patient_id, "Patient registered");
    Ok(RegisteredPatient {
        patient_id,
        qr_code,
    })
}

/// Replace the editable profile fields. The QR card is left as issued.
pub fn update_patient_profile(
    conn: &Connection,
    patient_id: i64,
    profile: &PatientProfile,
) -> Result<(), ServiceError> {
    profile.validate()?;
    let updated = db::update_patient_profile(conn, patient_id, profile).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => {
            ServiceError::Conflict("A patient with this email already exists".into())
        }
        other => ServiceError::Database(other),
    })?;
    if updated == 0 {
        return Err(patient_not_found());
    }
    Ok(())
}

pub fn change_patient_password(
    conn: &Connection,
    patient_id: i64,
    current_password: &str,
    new_password: &str,
    password_cost: u32,
) -> Result<(), ServiceError> {
    if current_password.is_empty() || new_password.is_empty() {
        return Err(ServiceError::Validation(
            "Current password and new password are required".into(),
        ));
    }
    let stored = db::get_patient_password_hash(conn, patient_id)?.ok_or_else(patient_not_found)?;
    if !verify_password(current_password, &stored)? {
        tracing::warn!(patient_id, "Password change rejected: wrong current password");
        return Err(ServiceError::WrongPassword);
    }

    let new_hash = hash_password(new_password, password_cost)?;
    db::update_patient_password(conn, patient_id, &new_hash)?;
    tracing::info!(patient_id, "Patient password changed");
    Ok(())
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, ServiceError> {
    Ok(db::list_patients(conn)?)
}

pub fn patient_profile(conn: &Connection, patient_id: i64) -> Result<Patient, ServiceError> {
    db::get_patient(conn, patient_id)?.ok_or_else(patient_not_found)
}

pub fn staff_profile(conn: &Connection, identity: Identity) -> Result<StaffProfile, ServiceError> {
    db::get_staff_profile(conn, identity.id, identity.role)?
        .ok_or_else(|| ServiceError::NotFound(format!("{} not found", capitalize(identity.role.as_str()))))
}

/// Administrative path for creating receptionist and doctor accounts.
pub fn provision_staff(
    conn: &Connection,
    staff: &NewStaff,
    password_cost: u32,
) -> Result<i64, ServiceError> {
    staff.validate()?;
    if !staff.role.is_staff() {
        return Err(ServiceError::Validation(format!(
            "{} is not a staff role",
            staff.role
        )));
    }
    let password_hash = hash_password(&staff.password, password_cost)?;
    let id = db::insert_staff(conn, &staff.name, &staff.email, staff.role, &password_hash)
        .map_err(|e| match e {
            DatabaseError::ConstraintViolation(_) => ServiceError::Conflict(format!(
                "A {} with this email already exists",
                staff.role
            )),
            other => ServiceError::Database(other),
        })?;
    tracing::info!(role = %staff.role, user_id = id, "Staff account provisioned");
    Ok(id)
}

fn patient_not_found() -> ServiceError {
    ServiceError::NotFound("Patient not found".into())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
