//! Argon2 password hashing for persona credentials.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::Result;

pub fn hash(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2.hash_password(plain.as_bytes(), &salt)?.to_string())
}

pub fn verify(plain: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash("secreto123").unwrap();
        assert!(verify("secreto123", &hashed));
        assert!(!verify("otro", &hashed));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify("secreto123", "not-a-phc-string"));
    }
}
