use std::fmt;

use x25519_dalek::{PublicKey as XPublicKey, SharedSecret, StaticSecret};

/// Size of an X25519 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of an X25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// DER header of a SubjectPublicKeyInfo wrapping an X25519 key (RFC 8410)
///
/// ```text
/// SEQUENCE(42) { SEQUENCE(5) { OID 1.3.101.110 } BIT STRING(33) { 0x00 || key } }
/// ```
const SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x03, 0x21, 0x00,
];
/// Size of an exported public key (SPKI DER) in bytes
pub const SPKI_SIZE: usize = SPKI_PREFIX.len() + PUBLIC_KEY_SIZE;

/// Errors that can occur during key operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key generation failed: {0}")]
    Generation(String),
    #[error("key export failed: {0}")]
    Export(String),
    #[error("key import failed: {0}")]
    Import(String),
}

/// Public half of a requestor keypair
///
/// This is the only key material that ever leaves a requestor session: it is
/// exported as SPKI DER, base64 encoded, and carried in the share link. Senders
/// import it and use it to wrap their per-message symmetric key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(XPublicKey);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&crate::codec::link::encode(self.0.as_bytes()))
            .finish()
    }
}

impl From<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        PublicKey(XPublicKey::from(bytes))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(KeyError::Import(format!(
                "invalid public key size, expected {}, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            )));
        }
        let mut buff = [0; PUBLIC_KEY_SIZE];
        buff.copy_from_slice(bytes);
        Ok(buff.into())
    }
}

impl PublicKey {
    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Encode the public key as an X25519 SubjectPublicKeyInfo
    pub fn to_spki(&self) -> [u8; SPKI_SIZE] {
        let mut out = [0; SPKI_SIZE];
        out[..SPKI_PREFIX.len()].copy_from_slice(&SPKI_PREFIX);
        out[SPKI_PREFIX.len()..].copy_from_slice(self.0.as_bytes());
        out
    }

    /// Import a public key from its SPKI DER encoding
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Import`] if the bytes are not an X25519
    /// SubjectPublicKeyInfo of the expected size.
    pub fn from_spki(spki: &[u8]) -> Result<Self, KeyError> {
        if spki.len() != SPKI_SIZE {
            return Err(KeyError::Import(format!(
                "invalid exported key size, expected {}, got {}",
                SPKI_SIZE,
                spki.len()
            )));
        }
        if spki[..SPKI_PREFIX.len()] != SPKI_PREFIX {
            return Err(KeyError::Import(
                "exported key is not an X25519 SubjectPublicKeyInfo".to_string(),
            ));
        }
        Self::try_from(&spki[SPKI_PREFIX.len()..])
    }

    pub(crate) fn as_x25519(&self) -> &XPublicKey {
        &self.0
    }
}

/// Private half of a requestor keypair
///
/// Deliberately neither `Clone`, `Serialize` nor printable: it lives inside a
/// single session and is dropped with it.
pub struct SecretKey(StaticSecret);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl From<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    fn from(secret: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(StaticSecret::from(secret))
    }
}

impl SecretKey {
    /// Generate a new random secret key using the OS RNG
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = [0u8; PRIVATE_KEY_SIZE];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| KeyError::Generation(format!("failed to generate random bytes: {e}")))?;
        Ok(Self::from(bytes))
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(XPublicKey::from(&self.0))
    }

    pub(crate) fn diffie_hellman(&self, other: &PublicKey) -> SharedSecret {
        self.0.diffie_hellman(other.as_x25519())
    }
}

/// An asymmetric keypair owned by one requestor session
#[derive(Debug)]
pub struct Keypair {
    public: PublicKey,
    secret: SecretKey,
}

impl Keypair {
    /// Generate a fresh keypair
    pub fn generate() -> Result<Self, KeyError> {
        let secret = SecretKey::generate()?;
        Ok(Self {
            public: secret.public(),
            secret,
        })
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let keypair = Keypair::generate().unwrap();
        assert_eq!(keypair.secret().public(), *keypair.public());

        let other = Keypair::generate().unwrap();
        assert_ne!(keypair.public(), other.public());
    }

    #[test]
    fn test_spki_roundtrip() {
        let keypair = Keypair::generate().unwrap();
        let spki = keypair.public().to_spki();
        assert_eq!(spki.len(), SPKI_SIZE);
        assert_eq!(&spki[..SPKI_PREFIX.len()], &SPKI_PREFIX);

        let recovered = PublicKey::from_spki(&spki).unwrap();
        assert_eq!(&recovered, keypair.public());
    }

    #[test]
    fn test_spki_rejects_wrong_length() {
        let keypair = Keypair::generate().unwrap();
        let spki = keypair.public().to_spki();

        let err = PublicKey::from_spki(&spki[..SPKI_SIZE - 1]).unwrap_err();
        assert!(matches!(err, KeyError::Import(_)));

        let mut long = spki.to_vec();
        long.push(0);
        assert!(PublicKey::from_spki(&long).is_err());
    }

    #[test]
    fn test_spki_rejects_foreign_algorithm() {
        let keypair = Keypair::generate().unwrap();
        let mut spki = keypair.public().to_spki();
        // Ed25519 OID (1.3.101.112) instead of X25519
        spki[8] = 0x70;
        let err = PublicKey::from_spki(&spki).unwrap_err();
        assert!(matches!(err, KeyError::Import(_)));
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let keypair = Keypair::generate().unwrap();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("SecretKey(..)"));
    }
}
