use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use validator::Validate;

use super::DISPLAY_DATE_FORMAT;
use crate::db::{self, PrescriptionJoinRow, PRESCRIPTION_DATE_FORMAT};
use crate::error::ServiceError;
use crate::models::*;

/// At least one line, and every line names its medication.
pub fn validate_medicines(medicines: &[MedicineLine]) -> Result<(), ServiceError> {
    if medicines.is_empty() {
        return Err(ServiceError::Validation(
            "At least one medicine is required".into(),
        ));
    }
    for medicine in medicines {
        medicine.validate()?;
    }
    Ok(())
}

pub fn add_prescription(
    conn: &Connection,
    doctor_id: i64,
    prescription: &NewPrescription,
) -> Result<i64, ServiceError> {
    add_prescription_at(conn, doctor_id, prescription, super::now())
}

/// Header and lines are written in one transaction.
pub fn add_prescription_at(
    conn: &Connection,
    doctor_id: i64,
    prescription: &NewPrescription,
    date: NaiveDateTime,
) -> Result<i64, ServiceError> {
    if prescription.patient_id <= 0 {
        return Err(ServiceError::Validation("Patient ID is required".into()));
    }
    validate_medicines(&prescription.medicines)?;

    let tx = conn.unchecked_transaction()?;
    if !db::patient_exists(&tx, prescription.patient_id)? {
        return Err(ServiceError::NotFound("Patient not found".into()));
    }
    let prescription_id = db::insert_prescription(&tx, doctor_id, prescription.patient_id, date)?;
    db::insert_medicines(&tx, prescription_id, &prescription.medicines)?;
    tx.commit()?;

    tracing::info!(
        prescription_id,
        doctor_id,
        patient_id = prescription.patient_id,
        medicines = prescription.medicines.len(),
        "Prescription added"
    );
    Ok(prescription_id)
}

/// Doctor view of a patient's prescriptions, newest first.
pub fn list_prescriptions_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PrescriptionRecord>, ServiceError> {
    let rows = db::fetch_prescription_rows(conn, patient_id)?;
    Ok(group_prescription_rows(rows))
}

/// Fold join rows into one record per prescription. Rows for the same
/// prescription must be adjacent, which the join's ordering guarantees.
pub fn group_prescription_rows(rows: Vec<PrescriptionJoinRow>) -> Vec<PrescriptionRecord> {
    let mut records: Vec<PrescriptionRecord> = Vec::new();
    for row in rows {
        let same = records
            .last()
            .is_some_and(|r| r.prescription_id == row.prescription_id);
        if !same {
            records.push(PrescriptionRecord {
                prescription_id: row.prescription_id,
                date: row.date.format(DISPLAY_DATE_FORMAT).to_string(),
                medicines: Vec::new(),
            });
        }
        if let (Some(medicine), Some(record)) = (row.medicine, records.last_mut()) {
            record.medicines.push(medicine);
        }
    }
    records
}

/// Patient view: same grouping, with the prescribing doctor attached.
pub fn list_prescriptions_with_doctor(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PatientPrescription>, ServiceError> {
    let headers = db::fetch_prescription_headers_with_doctor(conn, patient_id)?;
    let mut by_prescription: HashMap<i64, Vec<PatientMedicine>> = HashMap::new();
    for medicine in db::fetch_medicines_for_patient(conn, patient_id)? {
        by_prescription
            .entry(medicine.prescription_id)
            .or_default()
            .push(medicine);
    }

    Ok(headers
        .into_iter()
        .map(|h| PatientPrescription {
            prescription_id: h.prescription_id,
            formatted_date: h.date.format(DISPLAY_DATE_FORMAT).to_string(),
            date: h.date.format(PRESCRIPTION_DATE_FORMAT).to_string(),
            doctor_id: h.doctor_id,
            doctor_name: h.doctor_name,
            medicines: by_prescription.remove(&h.prescription_id).unwrap_or_default(),
        })
        .collect())
}

/// Delete every line of the prescription and insert the new set, in one
/// transaction. The header (doctor, patient, date) is untouched.
pub fn replace_prescription_medicines(
    conn: &Connection,
    prescription_id: i64,
    medicines: &[MedicineLine],
) -> Result<(), ServiceError> {
    validate_medicines(medicines)?;

    let tx = conn.unchecked_transaction()?;
    if !db::prescription_exists(&tx, prescription_id)? {
        return Err(ServiceError::NotFound("Prescription not found".into()));
    }
    let removed = db::delete_medicines(&tx, prescription_id)?;
    db::insert_medicines(&tx, prescription_id, medicines)?;
    tx.commit()?;

    tracing::info!(
        prescription_id,
        removed,
        inserted = medicines.len(),
        "Prescription medicines replaced"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    struct Fixture {
        conn: Connection,
        doctor: i64,
        patient: i64,
    }

    fn setup() -> Fixture {
        let conn = open_memory_database().unwrap();
        let doctor = db::insert_staff(&conn, "Dr. Quinn", "quinn@clinic.test", Role::Doctor, "h").unwrap();
        let patient = db::insert_patient(
            &conn,
            &NewPatient {
                name: "Pat".into(),
                email: "pat@x.com".into(),
                phone: None,
                age: None,
                gender: None,
                address: None,
                medical_history: "n/a".into(),
                password: "p".into(),
            },
            "h",
        )
        .unwrap();
        Fixture { conn, doctor, patient }
    }

    fn med(name: &str) -> MedicineLine {
        MedicineLine {
            medication: name.into(),
            dosage: "5mg".into(),
            frequency: "daily".into(),
            duration: "10 days".into(),
            notes: Some(format!("{name} with water")),
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, PRESCRIPTION_DATE_FORMAT).unwrap()
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn empty_medicines_rejected_without_writes() {
        let f = setup();
        let err = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![] },
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(count(&f.conn, "prescriptions"), 0);
        assert_eq!(count(&f.conn, "prescription_medicines"), 0);
    }

    #[test]
    fn medicine_without_name_rejected() {
        let f = setup();
        let err = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("A"), med("")] },
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("medication name")));
        assert_eq!(count(&f.conn, "prescriptions"), 0);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let f = setup();
        let err = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: 9999, medicines: vec![med("A")] },
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(count(&f.conn, "prescriptions"), 0);
    }

    /// Make every insert of a `Poison` line fail, after earlier statements
    /// of the same workflow have already run.
    fn reject_poison_lines(conn: &Connection) {
        conn.execute_batch(
            "CREATE TEMP TRIGGER reject_poison BEFORE INSERT ON prescription_medicines
             WHEN NEW.medication = 'Poison'
             BEGIN SELECT RAISE(ABORT, 'medicine rejected'); END;",
        )
        .unwrap();
    }

    #[test]
    fn failed_line_insert_leaves_no_orphan_header() {
        let f = setup();
        reject_poison_lines(&f.conn);

        let err = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription {
                patient_id: f.patient,
                medicines: vec![med("A"), med("Poison")],
            },
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)), "{err:?}");
        assert_eq!(count(&f.conn, "prescriptions"), 0);
        assert_eq!(count(&f.conn, "prescription_medicines"), 0);

        // The connection is usable again afterwards
        add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("A")] },
        )
        .unwrap();
        assert_eq!(count(&f.conn, "prescriptions"), 1);
    }

    #[test]
    fn failed_replace_keeps_original_lines() {
        let f = setup();
        let id = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription {
                patient_id: f.patient,
                medicines: vec![med("A"), med("B")],
            },
        )
        .unwrap();
        reject_poison_lines(&f.conn);

        let err = replace_prescription_medicines(&f.conn, id, &[med("C"), med("Poison")])
            .unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)), "{err:?}");

        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].medicines, vec![med("A"), med("B")]);
        assert_eq!(count(&f.conn, "prescription_medicines"), 2);
    }

    #[test]
    fn prescription_date_uses_the_visit_calendar() {
        let f = setup();
        let before = crate::clinical::today();
        add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("A")] },
        )
        .unwrap();
        let after = crate::clinical::today();

        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        let shown = &listed[0].date;
        assert!(
            *shown == before.format(DISPLAY_DATE_FORMAT).to_string()
                || *shown == after.format(DISPLAY_DATE_FORMAT).to_string(),
            "{shown} vs {before}"
        );
    }

    #[test]
    fn missing_patient_id_is_validation_error() {
        let f = setup();
        let err = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: 0, medicines: vec![med("A")] },
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn added_prescription_lists_both_medicines() {
        let f = setup();
        let id = add_prescription_at(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("M1"), med("M2")] },
            at("2025-03-15 08:30:00"),
        )
        .unwrap();

        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].prescription_id, id);
        assert_eq!(listed[0].date, "15-03-2025");
        assert_eq!(listed[0].medicines, vec![med("M1"), med("M2")]);
    }

    #[test]
    fn replace_leaves_exactly_new_set() {
        let f = setup();
        let id = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("M1"), med("M2")] },
        )
        .unwrap();

        replace_prescription_medicines(&f.conn, id, &[med("M3")]).unwrap();
        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].medicines, vec![med("M3")]);
    }

    #[test]
    fn replace_with_empty_set_keeps_old_lines() {
        let f = setup();
        let id = add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("M1")] },
        )
        .unwrap();

        let err = replace_prescription_medicines(&f.conn, id, &[]).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        assert_eq!(listed[0].medicines, vec![med("M1")]);
    }

    #[test]
    fn replace_unknown_prescription_is_not_found() {
        let f = setup();
        let err = replace_prescription_medicines(&f.conn, 4242, &[med("M")]).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(count(&f.conn, "prescription_medicines"), 0);
    }

    #[test]
    fn listing_is_newest_first_with_empty_headers() {
        let f = setup();
        let older = add_prescription_at(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("Old")] },
            at("2024-12-01 10:00:00"),
        )
        .unwrap();
        let bare = db::insert_prescription(&f.conn, f.doctor, f.patient, at("2025-01-01 10:00:00")).unwrap();

        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        let ids: Vec<i64> = listed.iter().map(|p| p.prescription_id).collect();
        assert_eq!(ids, vec![bare, older]);
        assert!(listed[0].medicines.is_empty());
    }

    #[test]
    fn same_timestamp_ties_break_by_id_desc() {
        let f = setup();
        let when = at("2025-02-02 02:02:02");
        let rx = |name: &str| NewPrescription { patient_id: f.patient, medicines: vec![med(name)] };
        let first = add_prescription_at(&f.conn, f.doctor, &rx("A"), when).unwrap();
        let second = add_prescription_at(&f.conn, f.doctor, &rx("B"), when).unwrap();

        let listed = list_prescriptions_for_patient(&f.conn, f.patient).unwrap();
        assert_eq!(listed[0].prescription_id, second);
        assert_eq!(listed[1].prescription_id, first);
    }

    #[test]
    fn group_rows_folds_adjacent_lines() {
        let rows = vec![
            PrescriptionJoinRow { prescription_id: 2, date: at("2025-01-02 00:00:00"), medicine: Some(med("A")) },
            PrescriptionJoinRow { prescription_id: 2, date: at("2025-01-02 00:00:00"), medicine: Some(med("B")) },
            PrescriptionJoinRow { prescription_id: 1, date: at("2025-01-01 00:00:00"), medicine: None },
        ];
        let grouped = group_prescription_rows(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].medicines.len(), 2);
        assert_eq!(grouped[0].date, "02-01-2025");
        assert!(grouped[1].medicines.is_empty());
    }

    #[test]
    fn patient_view_carries_doctor_and_instructions() {
        let f = setup();
        let id = add_prescription_at(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("Amox")] },
            at("2025-04-05 12:00:00"),
        )
        .unwrap();

        let listed = list_prescriptions_with_doctor(&f.conn, f.patient).unwrap();
        assert_eq!(listed.len(), 1);
        let rx = &listed[0];
        assert_eq!(rx.prescription_id, id);
        assert_eq!(rx.formatted_date, "05-04-2025");
        assert_eq!(rx.date, "2025-04-05 12:00:00");
        assert_eq!(rx.doctor_id, f.doctor);
        assert_eq!(rx.doctor_name, "Dr. Quinn");
        assert_eq!(rx.medicines[0].instructions.as_deref(), Some("Amox with water"));
    }

    #[test]
    fn other_patients_prescriptions_are_not_listed() {
        let f = setup();
        add_prescription(
            &f.conn,
            f.doctor,
            &NewPrescription { patient_id: f.patient, medicines: vec![med("A")] },
        )
        .unwrap();
        assert!(list_prescriptions_for_patient(&f.conn, f.patient + 1).unwrap().is_empty());
        assert!(list_prescriptions_with_doctor(&f.conn, f.patient + 1).unwrap().is_empty());
    }
}
