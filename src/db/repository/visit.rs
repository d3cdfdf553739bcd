use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_visit(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
    visit_date: NaiveDate,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO visits (doctor_id, patient_id, visit_date) VALUES (?1, ?2, ?3)",
        params![doctor_id, patient_id, visit_date.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The visit with this id, only if it belongs to `doctor_id`.
pub fn find_visit_for_doctor(
    conn: &Connection,
    visit_id: i64,
    doctor_id: i64,
) -> Result<Option<Visit>, DatabaseError> {
    let visit = conn
        .query_row(
            "SELECT id, doctor_id, patient_id, visit_date FROM visits
             WHERE id = ?1 AND doctor_id = ?2",
            params![visit_id, doctor_id],
            |row| {
                Ok(Visit {
                    id: row.get(0)?,
                    doctor_id: row.get(1)?,
                    patient_id: row.get(2)?,
                    visit_date: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(visit)
}

pub fn update_visit_date(
    conn: &Connection,
    visit_id: i64,
    doctor_id: i64,
    visit_date: NaiveDate,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE visits SET visit_date = ?1 WHERE id = ?2 AND doctor_id = ?3",
        params![visit_date.to_string(), visit_id, doctor_id],
    )?;
    Ok(updated)
}

pub fn delete_visit(conn: &Connection, visit_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM visits WHERE id = ?1", params![visit_id])?;
    Ok(deleted)
}

/// A doctor's visits on or after `from`, earliest first.
pub fn fetch_upcoming_visits_for_doctor(
    conn: &Connection,
    doctor_id: i64,
    from: NaiveDate,
) -> Result<Vec<UpcomingVisit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT v.id, v.visit_date, p.id, p.name, p.email
         FROM visits v
         JOIN patients p ON v.patient_id = p.id
         WHERE v.doctor_id = ?1 AND v.visit_date >= ?2
         ORDER BY v.visit_date ASC, v.id ASC",
    )?;

    let rows = stmt.query_map(params![doctor_id, from.to_string()], |row| {
        Ok(UpcomingVisit {
            id: row.get(0)?,
            visit_date: row.get(1)?,
            patient_id: row.get(2)?,
            patient_name: row.get(3)?,
            email: row.get(4)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// All of a patient's visits, past and future, earliest first.
pub fn fetch_visits_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<VisitDate>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, visit_date FROM visits WHERE patient_id = ?1
         ORDER BY visit_date ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(VisitDate {
            id: row.get(0)?,
            visit_date: row.get(1)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Earliest visit on or after `from`, joined with the doctor.
pub fn fetch_next_visit_for_patient(
    conn: &Connection,
    patient_id: i64,
    from: NaiveDate,
) -> Result<Option<NextVisit>, DatabaseError> {
    let visit = conn
        .query_row(
            "SELECT v.id, v.visit_date, u.id, u.name, u.email
             FROM visits v
             JOIN users u ON v.doctor_id = u.id
             WHERE v.patient_id = ?1 AND v.visit_date >= ?2 AND u.role = 'doctor'
             ORDER BY v.visit_date ASC, v.id ASC
             LIMIT 1",
            params![patient_id, from.to_string()],
            |row| {
                let visit_date: NaiveDate = row.get(1)?;
                Ok(NextVisit {
                    id: row.get(0)?,
                    formatted_visit_date: visit_date.format("%d-%m-%Y").to_string(),
                    visit_date,
                    doctor_id: row.get(2)?,
                    doctor_name: row.get(3)?,
                    doctor_email: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(visit)
}
