//! Password hashing, the password policy and reset tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};

use crate::error::{UserError, UserResult};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Argon2id with default parameters and a random salt.
pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 8 to 128 characters with an uppercase letter, a lowercase letter, a digit
/// and a special character.
pub fn validate_password(password: &str) -> UserResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(UserError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(UserError::Validation(format!(
            "Password cannot exceed {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(UserError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(UserError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_punctuation()) {
        return Err(UserError::Validation(
            "Password must contain at least one special character".to_string(),
        ));
    }
    Ok(())
}

pub const RESET_TOKEN_BYTES: usize = 32;

/// 32 random bytes as 64 hex characters. Only [`hash_token`] of it is stored.
pub fn generate_reset_token() -> String {
    let bytes: Vec<u8> = (0..RESET_TOKEN_BYTES)
        .map(|_| rand::random::<u8>())
        .collect();
    const_hex::encode(bytes)
}

/// Lowercase hex SHA-256 of `token`.
pub fn hash_token(token: &str) -> String {
    const_hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Sup3r$ecret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Sup3r$ecret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        assert_ne!(
            hash_password("Sup3r$ecret").unwrap(),
            hash_password("Sup3r$ecret").unwrap()
        );
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Sup3r$ecret").is_ok());

        for weak in ["Sh0r$", "alllower1$", "ALLUPPER1$", "NoDigits$$", "NoSpecial11"] {
            assert!(
                matches!(validate_password(weak), Err(UserError::Validation(_))),
                "{} should be rejected",
                weak
            );
        }

        assert!(validate_password(&"Aa1$".repeat(33)).is_err());
    }

    #[test]
    fn test_reset_token_hash_is_stable_hex() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(const_hex::decode(&token).unwrap().len(), RESET_TOKEN_BYTES);
        assert_ne!(token, generate_reset_token());

        let hash = hash_token(&token);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token(&token));
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
