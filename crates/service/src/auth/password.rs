//! Password encoders. The auth service only ever calls `encode` on signup and
//! `matches` on login; how the comparison works is up to the encoder.

use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;

use super::errors::AuthError;

pub trait PasswordEncoder: Send + Sync {
    fn algorithm(&self) -> &'static str;
    fn encode(&self, raw: &str) -> Result<String, AuthError>;
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// Stores and compares passwords verbatim. Only for local setups and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextEncoder;

impl PasswordEncoder for PlainTextEncoder {
    fn algorithm(&self) -> &'static str { "plain" }

    fn encode(&self, raw: &str) -> Result<String, AuthError> { Ok(raw.to_string()) }

    fn matches(&self, raw: &str, encoded: &str) -> bool { raw == encoded }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Encoder;

impl PasswordEncoder for Argon2Encoder {
    fn algorithm(&self) -> &'static str { "argon2" }

    fn encode(&self, raw: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        match PasswordHash::new(encoded) {
            Ok(parsed) => Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

/// Resolve the `auth.password_algorithm` setting.
pub fn encoder_for(algorithm: &str) -> Result<Arc<dyn PasswordEncoder>, AuthError> {
    match algorithm {
        "argon2" => Ok(Arc::new(Argon2Encoder)),
        "plain" => Ok(Arc::new(PlainTextEncoder)),
        other => Err(AuthError::Hash(format!("unsupported password algorithm: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_equality() {
        let enc = PlainTextEncoder;
        let stored = enc.encode("senha").unwrap();
        assert!(enc.matches("senha", &stored));
        assert!(!enc.matches("123", &stored));
    }

    #[test]
    fn argon2_round_trip() {
        let enc = Argon2Encoder;
        let stored = enc.encode("S3curePass!").unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(enc.matches("S3curePass!", &stored));
        assert!(!enc.matches("wrong", &stored));
    }

    #[test]
    fn argon2_rejects_non_hash() {
        assert!(!Argon2Encoder.matches("senha", "senha"));
    }

    #[test]
    fn resolves_configured_algorithm() {
        assert_eq!(encoder_for("plain").unwrap().algorithm(), "plain");
        assert_eq!(encoder_for("argon2").unwrap().algorithm(), "argon2");
        assert!(encoder_for("md5").is_err());
    }
}
