//! MD5 + RSA cipher matching the platform's login script.

use num_bigint::BigUint;

use super::{CipherError, CredentialCipher};

/// 1024-bit public modulus of the login page (hex).
pub const PORTAL_PUBLIC_MODULUS: &str = "b103b0e219862acf0c51b7cee921062684dab5aab44817ee1f32f54e7424793ca5f5410fce5476658771991f27146a46da03bcc599a4a586e0bbbc6bcb8b3e4909d85420cd8b1541d397e07d740fd79d318284b153442d13c33a0028e7868ce6ac6ee9766f04bb500465920122f9192df555b7d625cb7958c62c0ccd614454df";

/// Public exponent of the login page (hex).
pub const PORTAL_PUBLIC_EXPONENT: &str = "10001";

/// Cipher implementing the login page's hashing and encryption.
///
/// Encryption is textbook RSA over fixed-size blocks: the plaintext bytes are
/// zero-padded to a multiple of the block size, every block is read as a
/// little-endian integer and raised to the public exponent, and each result is
/// written as hex padded to whole 16-bit digits. Blocks are joined by a space.
#[derive(Debug, Clone)]
pub struct PortalCipher {
    modulus: BigUint,
    exponent: BigUint,
    chunk_size: usize,
}

impl PortalCipher {
    /// Cipher with the platform's public key.
    pub fn new() -> Result<Self, CipherError> {
        Self::with_key(PORTAL_PUBLIC_MODULUS, PORTAL_PUBLIC_EXPONENT)
    }

    /// Cipher with an arbitrary public key given as hex strings.
    pub fn with_key(modulus_hex: &str, exponent_hex: &str) -> Result<Self, CipherError> {
        let modulus = BigUint::parse_bytes(modulus_hex.as_bytes(), 16)
            .ok_or_else(|| CipherError::InvalidKey("modulus is not hex".to_string()))?;
        let exponent = BigUint::parse_bytes(exponent_hex.as_bytes(), 16)
            .ok_or_else(|| CipherError::InvalidKey("exponent is not hex".to_string()))?;

        // Block size is two bytes per 16-bit digit of the modulus, minus the top digit.
        let digits = modulus.bits().div_ceil(16) as usize;
        let chunk_size = digits.saturating_sub(1) * 2;
        if chunk_size == 0 {
            return Err(CipherError::InvalidKey(
                "modulus must be wider than 16 bits".to_string(),
            ));
        }

        Ok(Self {
            modulus,
            exponent,
            chunk_size,
        })
    }

    /// Plaintext block size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn to_latin1(input: &str) -> Result<Vec<u8>, CipherError> {
        input
            .chars()
            .map(|c| u8::try_from(u32::from(c)).map_err(|_| CipherError::UnsupportedCharacter(c)))
            .collect()
    }

    fn block_hex(value: &BigUint) -> String {
        let hex = value.to_str_radix(16);
        let width = hex.len().div_ceil(4).max(1) * 4;
        format!("{:0>width$}", hex, width = width)
    }
}

impl CredentialCipher for PortalCipher {
    fn hash(&self, input: &str) -> String {
        format!("{:x}", md5::compute(input.as_bytes()))
    }

    fn encrypt(&self, input: &str) -> Result<String, CipherError> {
        let mut bytes = Self::to_latin1(input)?;
        let padded_len = bytes.len().div_ceil(self.chunk_size) * self.chunk_size;
        bytes.resize(padded_len, 0);

        let blocks: Vec<String> = bytes
            .chunks(self.chunk_size)
            .map(|chunk| {
                let block = BigUint::from_bytes_le(chunk);
                Self::block_hex(&block.modpow(&self.exponent, &self.modulus))
            })
            .collect();

        Ok(blocks.join(" "))
    }
}
