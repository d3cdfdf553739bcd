use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Visit {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub visit_date: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
pub struct NewVisit {
    pub patient_id: i64,
    pub visit_date: NaiveDate,
}

/// Doctor's schedule entry, joined with the patient.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingVisit {
    pub id: i64,
    pub visit_date: NaiveDate,
    pub patient_id: i64,
    pub patient_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitDate {
    pub id: i64,
    pub visit_date: NaiveDate,
}

/// Patient's next visit, joined with the doctor.
#[derive(Debug, Clone, Serialize)]
pub struct NextVisit {
    pub id: i64,
    /// `dd-mm-YYYY`
    pub formatted_visit_date: String,
    pub visit_date: NaiveDate,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub doctor_email: String,
}
