use serde::Serialize;

use super::enums::Role;

/// A receptionist or doctor account, including the stored password hash.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

impl StaffUser {
    pub fn summary(&self) -> StaffSummary {
        StaffSummary {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Public view of a staff account returned after login.
#[derive(Debug, Clone, Serialize)]
pub struct StaffSummary {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}
