//! Password hashing built on argon2 with per-hash random salts.

use crate::error::IdentityError;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hashes a plain-text password into a PHC-format string.
pub(crate) fn hash_password(plain: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("Hashing password".into()),
        })
}

/// Verifies a plain-text password against a stored PHC-format hash.
///
/// A malformed stored hash is an internal error; a mismatching password is `Ok(false)`.
pub(crate) fn verify_password(plain: &str, stored: &str) -> Result<bool, IdentityError> {
    let parsed = PasswordHash::new(stored).map_err(|e| IdentityError::Internal {
        message: e.to_string().into(),
        context: Some("Parsing stored password hash".into()),
    })?;

    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("Verifying password".into()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let hash = hash_password("Testpass12").expect("hash");
        assert!(hash.starts_with("$argon2"), "PHC format expected: {hash}");
        assert!(verify_password("Testpass12", &hash).expect("verify"));
        assert!(!verify_password("wrong-password", &hash).expect("verify"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("Testpass12").expect("hash a");
        let b = hash_password("Testpass12").expect("hash b");
        assert_ne!(a, b, "same password must not produce identical hashes");
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let err = verify_password("x", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, IdentityError::Internal { .. }));
    }
}
