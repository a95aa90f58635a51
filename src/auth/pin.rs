use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{LedgerError, LedgerResult};

pub const MIN_PIN_LEN: usize = 4;

/// PINs are at least four ASCII digits.
pub fn validate_pin(pin: &str) -> LedgerResult<()> {
    if pin.len() < MIN_PIN_LEN || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::validation(format!(
            "PIN must be at least {MIN_PIN_LEN} digits"
        )));
    }
    Ok(())
}

pub fn hash_pin(pin: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(pin.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_pin(pin: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hashed)?;

    Argon2::default().verify_password(pin.as_bytes(), &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_format() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("004711").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[test]
    fn hashed_pin_verifies() {
        let hashed = hash_pin("2468").unwrap();
        assert!(verify_pin("2468", &hashed).is_ok());
        assert!(verify_pin("1357", &hashed).is_err());
        assert!(verify_pin("2468", "not-a-hash").is_err());
    }
}
