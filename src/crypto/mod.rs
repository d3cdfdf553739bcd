pub mod password;
pub mod token;

pub use password::*;
pub use token::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Malformed password hash")]
    MalformedHash,

    #[error("Unsupported hash cost: {0}")]
    UnsupportedCost(u32),

    #[error("Stored hash asks for too many rounds: {0}")]
    ExcessiveRounds(u32),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
