use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hashes a profile password into a PHC string with a fresh salt.
pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hashed)
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hashed)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_same_password() {
        let hashed = hash_password("changeme123").unwrap();
        assert!(hashed.starts_with("$argon2"));
        assert!(verify_password("changeme123", &hashed).unwrap());
        assert!(!verify_password("changeme124", &hashed).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
