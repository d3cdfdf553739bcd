use thiserror::Error;
use validator::ValidationErrors;

use crate::crypto::{CryptoError, TokenError};
use crate::db::DatabaseError;
use crate::qr::QrError;

/// Errors raised by the credential store and the clinical records engine.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Password hash error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("QR code error: {0}")]
    Qr(#[from] QrError),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlite(err))
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {field}"),
                })
            })
            .collect();
        messages.sort();
        messages.dedup();
        ServiceError::Validation(messages.join("; "))
    }
}
