use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored patient record without credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub medical_history: String,
    pub qr_code: Option<String>,
}

/// Canonical registration input, produced by boundary normalization.
#[derive(Debug, Clone, Validate)]
pub struct NewPatient {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Medical history is required"))]
    pub medical_history: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Editable profile fields. The QR code is not regenerated on update.
#[derive(Debug, Clone, Validate)]
pub struct PatientProfile {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Medical history is required"))]
    pub medical_history: String,
}

/// Login lookup row.
#[derive(Debug, Clone)]
pub struct PatientCredentials {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub id: i64,
    pub email: String,
}

/// Result of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredPatient {
    pub patient_id: i64,
    pub qr_code: String,
}
