use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str =
    "id, name, email, phone, age, gender, address, medical_history, qr_code";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        age: row.get(4)?,
        gender: row.get(5)?,
        address: row.get(6)?,
        medical_history: row.get(7)?,
        qr_code: row.get(8)?,
    })
}

/// Insert a patient without a QR code. Returns the new row id.
pub fn insert_patient(
    conn: &Connection,
    patient: &NewPatient,
    password_hash: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, email, phone, age, gender, address, medical_history,
         hashed_password)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.name,
            patient.email,
            patient.phone,
            patient.age,
            patient.gender,
            patient.address,
            patient.medical_history,
            password_hash,
        ],
    )
    .map_err(DatabaseError::from_insert)?;
    Ok(conn.last_insert_rowid())
}

pub fn set_patient_qr_code(
    conn: &Connection,
    patient_id: i64,
    qr_code: &str,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE patients SET qr_code = ?1 WHERE id = ?2",
        params![qr_code, patient_id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient_id.to_string(),
        });
    }
    Ok(())
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id"
    ))?;
    let rows = stmt.query_map([], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn patient_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
        params![id],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

pub fn find_patient_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<PatientCredentials>, DatabaseError> {
    let creds = conn
        .query_row(
            "SELECT id, email, hashed_password FROM patients WHERE email = ?1",
            params![email],
            |row| {
                Ok(PatientCredentials {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(creds)
}

pub fn get_patient_password_hash(
    conn: &Connection,
    id: i64,
) -> Result<Option<String>, DatabaseError> {
    let hash = conn
        .query_row(
            "SELECT hashed_password FROM patients WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hash)
}

/// Replace the editable profile fields. Returns the number of rows touched.
pub fn update_patient_profile(
    conn: &Connection,
    id: i64,
    profile: &PatientProfile,
) -> Result<usize, DatabaseError> {
    let updated = conn
        .execute(
            "UPDATE patients SET name = ?1, email = ?2, phone = ?3, age = ?4, gender = ?5,
             address = ?6, medical_history = ?7
             WHERE id = ?8",
            params![
                profile.name,
                profile.email,
                profile.phone,
                profile.age,
                profile.gender,
                profile.address,
                profile.medical_history,
                id,
            ],
        )
        .map_err(DatabaseError::from_insert)?;
    Ok(updated)
}

pub fn update_patient_password(
    conn: &Connection,
    id: i64,
    password_hash: &str,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE patients SET hashed_password = ?1 WHERE id = ?2",
        params![password_hash, id],
    )?;
    Ok(updated)
}
