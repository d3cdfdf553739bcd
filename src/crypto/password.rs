//! Salted password hashing for staff and patient credentials.
//!
//! Hashes are PHC strings produced by `pbkdf2` (PBKDF2-HMAC-SHA256), e.g.
//! `$pbkdf2-sha256$i=65536,l=32$<salt>$<hash>`. The iteration count is
//! `2^(cost + 6)` and travels with the hash, so verification never depends
//! on the current default.

use pbkdf2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use pbkdf2::{Algorithm, Params, Pbkdf2};

use super::CryptoError;

pub const PASSWORD_COST: u32 = 10;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

const MAX_COST: u32 = 20;

fn iterations(cost: u32) -> u32 {
    1 << (cost + 6)
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Hash `password` with a fresh salt at `cost` (`PASSWORD_COST` unless
/// configured otherwise).
pub fn hash_password(password: &str, cost: u32) -> Result<String, CryptoError> {
    if cost > MAX_COST {
        return Err(CryptoError::UnsupportedCost(cost));
    }
    let salt = SaltString::encode_b64(&generate_salt())
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
    let params = Params {
        rounds: iterations(cost),
        output_length: HASH_LENGTH,
    };
    let hash = Pbkdf2
        .hash_password_customized(
            password.as_bytes(),
            Some(Algorithm::Pbkdf2Sha256.ident()),
            None,
            params,
            &salt,
        )
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored hash. `Ok(false)` means a wrong
/// password; `Err` means the stored value is not a hash this module wrote.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CryptoError> {
    let parsed = PasswordHash::new(stored).map_err(|_| CryptoError::MalformedHash)?;
    if parsed.algorithm != Algorithm::Pbkdf2Sha256.ident() {
        return Err(CryptoError::MalformedHash);
    }
    let params = Params::try_from(&parsed).map_err(|_| CryptoError::MalformedHash)?;
    if params.rounds > iterations(MAX_COST) {
        return Err(CryptoError::ExcessiveRounds(params.rounds));
    }

    match Pbkdf2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(_) => Err(CryptoError::MalformedHash),
    }
}
