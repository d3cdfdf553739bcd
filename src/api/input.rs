//! Request bodies as clients send them, and their normalization into the
//! canonical types the services accept.
//!
//! Clients send ids as numbers or numeric strings and use both
//! `patient_id` and `patientId`; all of that is settled here, once.

use axum::extract::FromRequest;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::clinical::parse_visit_date;
use crate::models::*;

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// An integer sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleInt {
    Number(i64),
    Text(String),
}

impl FlexibleInt {
    pub fn parse(&self, field: &str) -> Result<i64, ApiError> {
        match self {
            FlexibleInt::Number(n) => Ok(*n),
            FlexibleInt::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("{field} must be a number"))),
        }
    }
}

/// Parse a path id: positive integers only.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest("Invalid ID format".into())),
    }
}

fn required_id(value: Option<&FlexibleInt>, field: &str) -> Result<i64, ApiError> {
    let id = value
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))?
        .parse(field)?;
    if id <= 0 {
        return Err(ApiError::BadRequest(format!("{field} must be positive")));
    }
    Ok(id)
}

fn text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn optional_age(value: Option<FlexibleInt>) -> Result<Option<i64>, ApiError> {
    match value {
        None => Ok(None),
        Some(FlexibleInt::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => v.parse("Age").map(Some),
    }
}

// ═══════════════════════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<FlexibleInt>,
    pub gender: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "medicalHistory")]
    pub medical_history: Option<String>,
    pub password: Option<String>,
}

impl PatientRequest {
    pub fn into_new_patient(self) -> Result<NewPatient, ApiError> {
        Ok(NewPatient {
            age: optional_age(self.age)?,
            name: text(self.name),
            email: text(self.email),
            phone: optional_text(self.phone),
            gender: optional_text(self.gender),
            address: optional_text(self.address),
            medical_history: text(self.medical_history),
            // Passwords are taken verbatim.
            password: self.password.unwrap_or_default(),
        })
    }

    pub fn into_profile(self) -> Result<PatientProfile, ApiError> {
        Ok(PatientProfile {
            age: optional_age(self.age)?,
            name: text(self.name),
            email: text(self.email),
            phone: optional_text(self.phone),
            gender: optional_text(self.gender),
            address: optional_text(self.address),
            medical_history: text(self.medical_history),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "current_password")]
    pub current_password: String,
    #[serde(alias = "new_password")]
    pub new_password: String,
}

// ═══════════════════════════════════════════════════════════
// Prescriptions
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MedicineInput {
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    #[serde(alias = "instructions")]
    pub notes: Option<String>,
}

impl From<MedicineInput> for MedicineLine {
    fn from(input: MedicineInput) -> Self {
        MedicineLine {
            medication: text(input.medication),
            dosage: text(input.dosage),
            frequency: text(input.frequency),
            duration: text(input.duration),
            notes: optional_text(input.notes),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddPrescriptionRequest {
    #[serde(alias = "patientId")]
    pub patient_id: Option<FlexibleInt>,
    pub medicines: Option<Vec<MedicineInput>>,
}

impl AddPrescriptionRequest {
    pub fn into_new_prescription(self) -> Result<NewPrescription, ApiError> {
        let patient_id = required_id(self.patient_id.as_ref(), "Patient ID")?;
        let medicines = self
            .medicines
            .ok_or_else(|| ApiError::BadRequest("Medicines are required".into()))?
            .into_iter()
            .map(MedicineLine::from)
            .collect();
        Ok(NewPrescription {
            patient_id,
            medicines,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplaceMedicinesRequest {
    pub medicines: Option<Vec<MedicineInput>>,
}

impl ReplaceMedicinesRequest {
    pub fn into_medicines(self) -> Vec<MedicineLine> {
        self.medicines
            .unwrap_or_default()
            .into_iter()
            .map(MedicineLine::from)
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════
// Visits
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddVisitRequest {
    #[serde(alias = "patientId")]
    pub patient_id: Option<FlexibleInt>,
    #[serde(alias = "visitDate")]
    pub visit_date: Option<String>,
}

impl AddVisitRequest {
    pub fn into_new_visit(self) -> Result<NewVisit, ApiError> {
        let patient_id = required_id(self.patient_id.as_ref(), "Patient ID")?;
        let visit_date = parse_visit_date(self.visit_date.as_deref().unwrap_or_default())?;
        Ok(NewVisit {
            patient_id,
            visit_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RescheduleVisitRequest {
    #[serde(alias = "visitDate")]
    pub visit_date: Option<String>,
}
