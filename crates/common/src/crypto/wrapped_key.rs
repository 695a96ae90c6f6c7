//! Wrapping a per-message secret for the requestor using ECDH + AES Key Wrap
//!
//! The requestor's public key cannot encrypt arbitrary-length messages, so a
//! sender wraps a 256-bit [`Secret`] for it instead and encrypts the message
//! with that secret.
//!
//! # Protocol Overview
//!
//! To wrap a secret for a requestor:
//! 1. **Generate ephemeral keypair**: a throwaway X25519 key for this message
//! 2. **Perform ECDH**: ephemeral secret × requestor public key
//! 3. **Derive KEK**: BLAKE3 `derive_key` over the shared secret and both public keys
//! 4. **Wrap key**: AES-KW (RFC 3394) encrypts the secret under the KEK
//! 5. **Package**: `ephemeral_pubkey || wrapped_secret`
//!
//! The requestor recovers the secret by repeating the ECDH with its private
//! key and unwrapping. AES-KW carries an integrity check, so a wrong key or a
//! flipped bit fails instead of yielding a different secret.

use std::convert::TryFrom;

use aes_kw::KekAes256 as Kek;

use super::keys::{KeyError, PublicKey, SecretKey, PUBLIC_KEY_SIZE};
use super::secret::{Secret, SecretError, SECRET_SIZE};

/// Size of the AES Key Wrap integrity block in bytes
pub const KW_IV_SIZE: usize = 8;
/// Total size of a wrapped key in bytes
///
/// Layout: ephemeral_pubkey (32) || wrapped_secret (40) = 72 bytes
pub const WRAPPED_KEY_SIZE: usize = PUBLIC_KEY_SIZE + SECRET_SIZE + KW_IV_SIZE;

/// BLAKE3 context string for deriving the key-encryption key
const KEK_CONTEXT: &str = "hush 2024-05-01 x25519 aes-kw key wrap";

/// Errors that can occur while wrapping or unwrapping a secret
#[derive(Debug, thiserror::Error)]
pub enum WrapError {
    #[error("wrap error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),
}

/// A [`Secret`] wrapped for the holder of one specific private key
///
/// # Wire Format
///
/// ```text
/// [ ephemeral_pubkey: 32 bytes ][ wrapped_secret: 40 bytes ]
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct WrappedKey(pub(crate) [u8; WRAPPED_KEY_SIZE]);

impl From<[u8; WRAPPED_KEY_SIZE]> for WrappedKey {
    fn from(bytes: [u8; WRAPPED_KEY_SIZE]) -> Self {
        WrappedKey(bytes)
    }
}

impl TryFrom<&[u8]> for WrappedKey {
    type Error = WrapError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != WRAPPED_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid wrapped key size, expected {}, got {}",
                WRAPPED_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        let mut buff = [0; WRAPPED_KEY_SIZE];
        buff.copy_from_slice(bytes);
        Ok(WrappedKey(buff))
    }
}

fn derive_kek(shared: &[u8; 32], ephemeral: &PublicKey, recipient: &PublicKey) -> Kek {
    let mut material = Vec::with_capacity(3 * PUBLIC_KEY_SIZE);
    material.extend_from_slice(shared);
    material.extend_from_slice(&ephemeral.to_bytes());
    material.extend_from_slice(&recipient.to_bytes());
    Kek::from(blake3::derive_key(KEK_CONTEXT, &material))
}

impl WrappedKey {
    /// Wrap `secret` so that only the holder of `recipient`'s private key can recover it
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::Key`] with [`KeyError::Import`] if `recipient` is a
    /// low-order point (no shared secret can be agreed with it), and other
    /// variants if ephemeral key generation or wrapping fails.
    pub fn new(secret: &Secret, recipient: &PublicKey) -> Result<Self, WrapError> {
        let ephemeral_private = SecretKey::generate()?;
        let ephemeral_public = ephemeral_private.public();

        let shared_secret = ephemeral_private.diffie_hellman(recipient);
        if !shared_secret.was_contributory() {
            return Err(KeyError::Import("public key is a low-order point".to_string()).into());
        }

        let kek = derive_kek(shared_secret.as_bytes(), &ephemeral_public, recipient);
        let wrapped = kek
            .wrap_vec(secret.bytes())
            .map_err(|_| anyhow::anyhow!("AES-KW wrap error"))?;

        if PUBLIC_KEY_SIZE + wrapped.len() != WRAPPED_KEY_SIZE {
            return Err(anyhow::anyhow!("expected wrapped key size is incorrect").into());
        };

        let mut out = [0; WRAPPED_KEY_SIZE];
        out[..PUBLIC_KEY_SIZE].copy_from_slice(&ephemeral_public.to_bytes());
        out[PUBLIC_KEY_SIZE..].copy_from_slice(&wrapped);
        Ok(WrappedKey(out))
    }

    /// Recover the wrapped secret using the recipient's private key
    ///
    /// # Errors
    ///
    /// Returns an error if the key was wrapped for someone else, or if the
    /// bytes were corrupted or tampered with. Callers must not tell these apart.
    pub fn recover(&self, recipient_secret: &SecretKey) -> Result<Secret, WrapError> {
        let ephemeral_public = PublicKey::try_from(&self.0[..PUBLIC_KEY_SIZE])?;

        let shared_secret = recipient_secret.diffie_hellman(&ephemeral_public);
        if !shared_secret.was_contributory() {
            return Err(anyhow::anyhow!("ephemeral key is a low-order point").into());
        }

        let kek = derive_kek(
            shared_secret.as_bytes(),
            &ephemeral_public,
            &recipient_secret.public(),
        );
        let unwrapped = kek
            .unwrap_vec(&self.0[PUBLIC_KEY_SIZE..])
            .map_err(|_| anyhow::anyhow!("AES-KW unwrap error"))?;

        Ok(Secret::from_slice(&unwrapped)?)
    }

    /// Get a reference to the raw wrapped key bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_and_recover() {
        let secret = Secret::from([42u8; SECRET_SIZE]);
        let private_key = SecretKey::generate().unwrap();
        let public_key = private_key.public();
        let wrapped = WrappedKey::new(&secret, &public_key).unwrap();
        let recovered = wrapped.recover(&private_key).unwrap();
        assert_eq!(secret, recovered);
    }

    #[test]
    fn test_wrap_different_keys() {
        let secret = Secret::generate().unwrap();
        let alice_private = SecretKey::generate().unwrap();
        let bob_private = SecretKey::generate().unwrap();

        let wrapped = WrappedKey::new(&secret, &alice_private.public()).unwrap();
        assert_eq!(secret, wrapped.recover(&alice_private).unwrap());
        assert!(wrapped.recover(&bob_private).is_err());
    }

    #[test]
    fn test_wrap_uses_fresh_ephemeral_key() {
        let secret = Secret::from([1u8; SECRET_SIZE]);
        let public_key = SecretKey::generate().unwrap().public();
        let a = WrappedKey::new(&secret, &public_key).unwrap();
        let b = WrappedKey::new(&secret, &public_key).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.bytes()[..PUBLIC_KEY_SIZE], b.bytes()[..PUBLIC_KEY_SIZE]);
    }

    #[test]
    fn test_tampered_wrapped_key_fails() {
        let secret = Secret::generate().unwrap();
        let private_key = SecretKey::generate().unwrap();
        let wrapped = WrappedKey::new(&secret, &private_key.public()).unwrap();

        for i in 0..WRAPPED_KEY_SIZE {
            let mut bytes = wrapped.0;
            bytes[i] ^= 0x80;
            let tampered = WrappedKey::from(bytes);
            assert!(tampered.recover(&private_key).is_err(), "byte {} flip", i);
        }
    }

    #[test]
    fn test_low_order_recipient_rejected() {
        let secret = Secret::generate().unwrap();
        let zero = PublicKey::from([0u8; PUBLIC_KEY_SIZE]);
        let err = WrappedKey::new(&secret, &zero).unwrap_err();
        assert!(matches!(err, WrapError::Key(KeyError::Import(_))));
    }

    #[test]
    fn test_try_from_invalid_length() {
        assert!(WrappedKey::try_from(&[0u8; WRAPPED_KEY_SIZE - 1][..]).is_err());
        assert!(WrappedKey::try_from(&[0u8; WRAPPED_KEY_SIZE + 1][..]).is_err());
        assert!(WrappedKey::try_from(&[0u8; WRAPPED_KEY_SIZE][..]).is_ok());
    }
}
