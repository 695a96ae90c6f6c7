//! Per-message content encryption using AES-256-GCM
//!
//! A sender generates one [`Secret`] for every plaintext it encrypts. The key is
//! wrapped for the requestor (see [`super::WrappedKey`]) and then consumed by
//! [`Secret::encrypt`], so the same key can never seal a second message.
//!
//! Each encryption also draws a random 96-bit nonce. Fresh key material per
//! message already rules out `(key, nonce)` reuse; the random nonce keeps that
//! true even if a key were ever reused by a future caller.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};

/// Size of the AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Size of the symmetric key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A 256-bit symmetric key for one message
///
/// Ciphertext layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
/// The associated data passed to both `encrypt` and `decrypt` binds the
/// ciphertext to its context (the wrapped key in a transport payload).
#[derive(PartialEq, Eq)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Generate a new random secret using the OS RNG
    pub fn generate() -> Result<Self, SecretError> {
        let mut buff = [0; SECRET_SIZE];
        getrandom::getrandom(&mut buff)
            .map_err(|e| anyhow::anyhow!("failed to generate random bytes: {}", e))?;
        Ok(Self(buff))
    }

    /// Create a secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SECRET_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        if data.len() != SECRET_SIZE {
            return Err(anyhow::anyhow!(
                "invalid secret size, expected {}, got {}",
                SECRET_SIZE,
                data.len()
            )
            .into());
        }
        let mut buff = [0; SECRET_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the secret key bytes
    pub(crate) fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt `data` and consume the key
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails or the cipher rejects the input.
    pub fn encrypt(self, data: &[u8], aad: &[u8]) -> Result<Vec<u8>, SecretError> {
        let cipher = Aes256Gcm::new_from_slice(self.bytes())
            .map_err(|_| anyhow::anyhow!("invalid key length"))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| anyhow::anyhow!("failed to generate nonce: {}", e))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: data, aad })
            .map_err(|_| anyhow::anyhow!("encrypt error"))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt data produced by [`Secret::encrypt`]
    ///
    /// # Errors
    ///
    /// Returns an error if the data is too short or authentication fails
    /// (wrong key, wrong associated data, or tampering).
    pub fn decrypt(&self, data: &[u8], aad: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(anyhow::anyhow!("data too short for nonce and tag").into());
        }

        let cipher = Aes256Gcm::new_from_slice(self.bytes())
            .map_err(|_| anyhow::anyhow!("invalid key length"))?;
        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        let plaintext = cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &data[NONCE_SIZE..],
                    aad,
                },
            )
            .map_err(|_| anyhow::anyhow!("decrypt error"))?;

        Ok(plaintext)
    }
}
