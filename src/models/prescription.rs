use serde::{Deserialize, Serialize};
use validator::Validate;

/// One medicine line of a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MedicineLine {
    #[validate(length(min = 1, message = "Each medicine requires a medication name"))]
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub notes: Option<String>,
}

/// A prescription as accepted from a doctor, after boundary normalization.
#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub medicines: Vec<MedicineLine>,
}

/// Doctor-facing prescription: header plus its medicine lines.
#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionRecord {
    pub prescription_id: i64,
    /// `dd-mm-YYYY`
    pub date: String,
    pub medicines: Vec<MedicineLine>,
}

/// Patient-facing prescription, carrying the prescribing doctor.
#[derive(Debug, Clone, Serialize)]
pub struct PatientPrescription {
    pub prescription_id: i64,
    pub formatted_date: String,
    pub date: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub medicines: Vec<PatientMedicine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientMedicine {
    pub prescription_id: i64,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
}
