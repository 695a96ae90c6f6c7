//! Sender side: wrap a fresh key for the requestor and encrypt one secret
//!
//! Every plaintext gets its own [`WrapContext`]: a newly generated [`Secret`]
//! wrapped for the requestor. [`WrapContext::encrypt`] consumes the context,
//! so re-encrypting an edited message always goes back through [`prepare`].

use crate::codec::{link, LinkError, TransportPayload};
use crate::crypto::{KeyError, PublicKey, Secret, WrapError, WrappedKey};
use crate::error::ErrorKind;

/// Errors produced by the sender pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The link or the public key inside it is unusable
    #[error("invalid link: {0}")]
    InvalidLink(String),
    /// Any other failure while preparing keys or encrypting
    #[error("failed to encrypt: {0}")]
    Encryption(String),
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SendError::InvalidLink(_) => ErrorKind::KeyImport,
            SendError::Encryption(_) => ErrorKind::Encryption,
        }
    }
}

impl From<LinkError> for SendError {
    fn from(e: LinkError) -> Self {
        SendError::InvalidLink(e.to_string())
    }
}

impl From<KeyError> for SendError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::Import(_) => SendError::InvalidLink(e.to_string()),
            _ => SendError::Encryption(e.to_string()),
        }
    }
}

impl From<WrapError> for SendError {
    fn from(e: WrapError) -> Self {
        match e {
            WrapError::Key(key) => key.into(),
            other => SendError::Encryption(other.to_string()),
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> SendError {
    SendError::Encryption(e.to_string())
}

/// A fresh secret, already wrapped for the requestor, ready to encrypt one message
#[derive(Debug)]
pub struct WrapContext {
    secret: Secret,
    wrapped_key: WrappedKey,
}

impl WrapContext {
    pub fn wrapped_key(&self) -> &WrappedKey {
        &self.wrapped_key
    }

    /// Encrypt `plaintext` under this context's secret, consuming it
    pub async fn encrypt(self, plaintext: &str) -> Result<TransportPayload, SendError> {
        let WrapContext {
            secret,
            wrapped_key,
        } = self;
        let data = plaintext.as_bytes().to_vec();
        let ciphertext =
            tokio::task::spawn_blocking(move || secret.encrypt(&data, wrapped_key.bytes()))
                .await
                .map_err(join_error)?
                .map_err(|e| SendError::Encryption(e.to_string()))?;
        Ok(TransportPayload::new(wrapped_key, ciphertext))
    }
}

/// Import the requestor's public key and wrap a freshly generated secret for it
///
/// Importing the key and generating the secret are independent and run
/// concurrently; wrapping waits for both.
pub async fn prepare(public_key_bytes: &[u8]) -> Result<WrapContext, SendError> {
    let spki = public_key_bytes.to_vec();
    let (public_key, secret) = tokio::join!(
        tokio::task::spawn_blocking(move || PublicKey::from_spki(&spki)),
        tokio::task::spawn_blocking(Secret::generate),
    );
    let public_key = public_key.map_err(join_error)??;
    let secret = secret
        .map_err(join_error)?
        .map_err(|e| SendError::Encryption(e.to_string()))?;

    prepare_for(public_key, secret).await
}

async fn prepare_for(public_key: PublicKey, secret: Secret) -> Result<WrapContext, SendError> {
    let context = tokio::task::spawn_blocking(move || {
        WrappedKey::new(&secret, &public_key).map(|wrapped_key| WrapContext {
            secret,
            wrapped_key,
        })
    })
    .await
    .map_err(join_error)??;
    tracing::debug!("prepared wrapped key for message");
    Ok(context)
}

/// A sender bound to one share link
///
/// The link is validated once, up front, so a broken link is reported before
/// the user enters a secret. Each call to [`Sender::seal`] prepares new key
/// material.
#[derive(Debug, Clone)]
pub struct Sender {
    public_key: PublicKey,
}

impl Sender {
    /// Build a sender from a share link or a bare link token
    pub async fn from_link(input: &str) -> Result<Self, SendError> {
        let token = link::token_from_input(input)?;
        let spki = link::decode(&token)?;
        let public_key = tokio::task::spawn_blocking(move || PublicKey::from_spki(&spki))
            .await
            .map_err(|e| SendError::InvalidLink(e.to_string()))??;
        Ok(Self { public_key })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Encrypt one secret for the requestor under fresh key material
    pub async fn seal(&self, plaintext: &str) -> Result<TransportPayload, SendError> {
        let secret = tokio::task::spawn_blocking(Secret::generate)
            .await
            .map_err(join_error)?
            .map_err(|e| SendError::Encryption(e.to_string()))?;
        let context = prepare_for(self.public_key, secret).await?;
        context.encrypt(plaintext).await
    }
}
