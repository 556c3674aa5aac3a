//! Salted SHA-256 credential hashing

use customs_domain::traits::CredentialStore;
use customs_domain::{CustomsError, Result};
use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// [`CredentialStore`] producing `sha256$<salt>$<hex digest>` strings
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Credentials;

impl Sha256Credentials {
    fn digest(salt: &str, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl CredentialStore for Sha256Credentials {
    fn hash(&self, secret: &str) -> Result<String> {
        if secret.is_empty() {
            return Err(CustomsError::Validation("credential is required".to_string()));
        }
        let salt = Uuid::new_v4().simple().to_string();
        Ok(format!("{SCHEME}${salt}${}", Self::digest(&salt, secret)))
    }

    fn verify(&self, secret: &str, hash: &str) -> bool {
        let mut parts = hash.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(SCHEME), Some(salt), Some(digest)) => Self::digest(salt, secret) == digest,
            _ => false,
        }
    }
}
