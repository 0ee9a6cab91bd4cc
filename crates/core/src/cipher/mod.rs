//! Credential transforms applied before login.
//!
//! The platform expects the username encrypted, and the password hashed and
//! then encrypted, using the RSA scheme of its login page script.

mod portal_cipher;

pub use portal_cipher::{PortalCipher, PORTAL_PUBLIC_EXPONENT, PORTAL_PUBLIC_MODULUS};

use thiserror::Error;

/// Errors that can occur while transforming credentials.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    #[error("Character {0:?} cannot be encrypted (only Latin-1 is supported)")]
    UnsupportedCharacter(char),
}

/// One-way hash and public-key encryption of login fields.
pub trait CredentialCipher: Send + Sync {
    /// Irreversible digest of the input.
    fn hash(&self, input: &str) -> String;

    /// Encrypt the input for the server's private key.
    fn encrypt(&self, input: &str) -> Result<String, CipherError>;
}
