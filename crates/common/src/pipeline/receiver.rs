//! Requestor side: turn a pasted payload back into the secret
//!
//! Three ordered stages, each failing on its own:
//! 1. decode the token into a wrapped key and ciphertext ([`ReceiveError::Decoding`])
//! 2. unwrap the key and decrypt ([`ReceiveError::Decryption`])
//! 3. decode the plaintext as UTF-8 ([`ReceiveError::Decoding`])
//!
//! Stage 2 reports one opaque error whatever went wrong (wrong key, tampering,
//! corruption) so the pipeline never acts as an oracle.

use std::sync::Arc;

use crate::codec::TransportPayload;
use crate::crypto::Keypair;
use crate::error::ErrorKind;

/// Errors produced by the receiver pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiveError {
    #[error("failed to decode message: {0}")]
    Decoding(String),
    #[error("failed to decrypt message")]
    Decryption,
}

impl ReceiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReceiveError::Decoding(_) => ErrorKind::Decoding,
            ReceiveError::Decryption => ErrorKind::Decryption,
        }
    }
}

/// Anything that can turn a payload token into plaintext
///
/// [`crate::session::DecryptSlot`] drives attempts through this seam.
#[async_trait::async_trait]
pub trait Decrypt: Send + Sync + 'static {
    async fn decrypt(&self, token: &str) -> Result<String, ReceiveError>;
}

/// Decrypts payloads sent to one requestor keypair
#[derive(Debug, Clone)]
pub struct Receiver {
    keypair: Arc<Keypair>,
}

impl Receiver {
    pub fn new(keypair: Arc<Keypair>) -> Self {
        Self { keypair }
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

#[async_trait::async_trait]
impl Decrypt for Receiver {
    async fn decrypt(&self, token: &str) -> Result<String, ReceiveError> {
        let payload =
            TransportPayload::decode(token).map_err(|e| ReceiveError::Decoding(e.to_string()))?;

        let keypair = self.keypair.clone();
        let decrypted = tokio::task::spawn_blocking(move || {
            let secret = payload.wrapped_key.recover(keypair.secret()).ok()?;
            secret
                .decrypt(&payload.ciphertext, payload.wrapped_key.bytes())
                .ok()
        })
        .await;

        // a panic inside the primitives is treated like any other decryption failure
        let plaintext = match decrypted {
            Ok(Some(plaintext)) => plaintext,
            Ok(None) | Err(_) => {
                tracing::debug!("payload failed to decrypt");
                return Err(ReceiveError::Decryption);
            }
        };

        String::from_utf8(plaintext)
            .map_err(|_| ReceiveError::Decoding("decrypted message is not valid UTF-8".to_string()))
    }
}
