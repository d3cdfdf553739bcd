use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

/// Storage format for prescription timestamps.
pub const PRESCRIPTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the prescriptions ⟕ prescription_medicines join.
/// `medicine` is `None` for a header without lines.
#[derive(Debug, Clone)]
pub struct PrescriptionJoinRow {
    pub prescription_id: i64,
    pub date: NaiveDateTime,
    pub medicine: Option<MedicineLine>,
}

/// Prescription header joined with the prescribing doctor.
#[derive(Debug, Clone)]
pub struct PrescriptionHeaderRow {
    pub prescription_id: i64,
    pub date: NaiveDateTime,
    pub doctor_id: i64,
    pub doctor_name: String,
}

pub fn insert_prescription(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
    date: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (doctor_id, patient_id, date) VALUES (?1, ?2, ?3)",
        params![
            doctor_id,
            patient_id,
            date.format(PRESCRIPTION_DATE_FORMAT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Bulk-insert medicine lines under one header. Returns rows inserted.
pub fn insert_medicines(
    conn: &Connection,
    prescription_id: i64,
    medicines: &[MedicineLine],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO prescription_medicines
         (prescription_id, medication, dosage, frequency, duration, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut inserted = 0;
    for med in medicines {
        inserted += stmt.execute(params![
            prescription_id,
            med.medication,
            med.dosage,
            med.frequency,
            med.duration,
            med.notes,
        ])?;
    }
    Ok(inserted)
}

pub fn delete_medicines(conn: &Connection, prescription_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM prescription_medicines WHERE prescription_id = ?1",
        params![prescription_id],
    )?;
    Ok(deleted)
}

pub fn prescription_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM prescriptions WHERE id = ?1)",
        params![id],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

/// Left join of a patient's prescriptions with their medicines, newest
/// header first, lines in insertion order.
pub fn fetch_prescription_rows(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PrescriptionJoinRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.date, m.medication, m.dosage, m.frequency, m.duration, m.notes
         FROM prescriptions p
         LEFT JOIN prescription_medicines m ON p.id = m.prescription_id
         WHERE p.patient_id = ?1
         ORDER BY p.date DESC, p.id DESC, m.id ASC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        let medication: Option<String> = row.get(2)?;
        let medicine = match medication {
            Some(medication) => Some(MedicineLine {
                medication,
                dosage: row.get(3)?,
                frequency: row.get(4)?,
                duration: row.get(5)?,
                notes: row.get(6)?,
            }),
            None => None,
        };
        Ok(PrescriptionJoinRow {
            prescription_id: row.get(0)?,
            date: row.get(1)?,
            medicine,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Headers of a patient's prescriptions with the prescribing doctor,
/// newest first.
pub fn fetch_prescription_headers_with_doctor(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PrescriptionHeaderRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.date, p.doctor_id, u.name
         FROM prescriptions p
         JOIN users u ON p.doctor_id = u.id AND u.role = 'doctor'
         WHERE p.patient_id = ?1
         ORDER BY p.date DESC, p.id DESC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(PrescriptionHeaderRow {
            prescription_id: row.get(0)?,
            date: row.get(1)?,
            doctor_id: row.get(2)?,
            doctor_name: row.get(3)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Every medicine line across a patient's prescriptions.
pub fn fetch_medicines_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PatientMedicine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT m.prescription_id, m.medication, m.dosage, m.frequency, m.duration, m.notes
         FROM prescription_medicines m
         JOIN prescriptions p ON p.id = m.prescription_id
         WHERE p.patient_id = ?1
         ORDER BY m.id ASC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(PatientMedicine {
            prescription_id: row.get(0)?,
            medication: row.get(1)?,
            dosage: row.get(2)?,
            frequency: row.get(3)?,
            duration: row.get(4)?,
            instructions: row.get(5)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
