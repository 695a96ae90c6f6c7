//! Explicit session state for the requestor
//!
//! A requestor session owns its keypair from start to end: the keypair is
//! generated in the background when the session starts, the share link is
//! derived from it, and both are dropped with the session. Nothing here is
//! global or persisted.

mod decrypt;
mod deferred;

use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use crate::codec::link;
use crate::crypto::Keypair;
use crate::error::ErrorKind;
use crate::pipeline::{export_public_key, generate_keypair, Receiver};

pub use decrypt::{DecryptSlot, DecryptState, DecryptView};
pub use deferred::{Deferred, Resource};

/// Session-terminal failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("failed to create keypair: {0}")]
    KeyGeneration(String),
    #[error("failed to export public key: {0}")]
    KeyExport(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::KeyGeneration(_) => ErrorKind::KeyGeneration,
            SessionError::KeyExport(_) => ErrorKind::KeyExport,
        }
    }
}

/// One requestor's keypair, share link and decrypt input
pub struct RequestorSession {
    keypair: Deferred<Arc<Keypair>, SessionError>,
    share_link: Deferred<Url, SessionError>,
    tasks: Vec<JoinHandle<()>>,
}

impl RequestorSession {
    /// Start a session whose share link is built on `base_url`
    ///
    /// Returns immediately; key generation and export run in the background.
    pub fn start(base_url: Url) -> Self {
        let (keypair, keygen_task) = Deferred::spawn(
            async {
                generate_keypair()
                    .await
                    .map(Arc::new)
                    .map_err(|e| SessionError::KeyGeneration(e.to_string()))
            },
            SessionError::KeyGeneration("key generation was interrupted".to_string()),
        );

        let pending = keypair.clone();
        let (share_link, export_task) = Deferred::spawn(
            async move {
                let keypair = pending.wait().await?;
                let exported = export_public_key(&keypair)
                    .await
                    .map_err(|e| SessionError::KeyExport(e.to_string()))?;
                Ok(link::share_url(&base_url, &exported))
            },
            SessionError::KeyExport("key export was interrupted".to_string()),
        );

        tracing::debug!("requestor session started");
        Self {
            keypair,
            share_link,
            tasks: vec![keygen_task, export_task],
        }
    }

    pub fn keypair(&self) -> &Deferred<Arc<Keypair>, SessionError> {
        &self.keypair
    }

    pub fn share_link(&self) -> &Deferred<Url, SessionError> {
        &self.share_link
    }

    /// Wait for the keypair and open the payload input for it
    pub async fn decrypt_slot(&self) -> Result<DecryptSlot, SessionError> {
        let keypair = self.keypair.wait().await?;
        Ok(DecryptSlot::new(Receiver::new(keypair)))
    }
}

impl Drop for RequestorSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        tracing::debug!("requestor session ended, keys discarded");
    }
}
