//! API endpoint handlers, one module per route group.
//!
//! Handlers normalize input, then hand a closure to `ApiContext::with_db`
//! so database and hashing work runs on the blocking pool.

pub mod auth;
pub mod doctors;
pub mod health;
pub mod patient;
pub mod patients;
pub mod receptionist;

use serde::Serialize;

/// `{success: true, message}` acknowledgement used by write endpoints.
#[derive(Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
