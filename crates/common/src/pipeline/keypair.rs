use crate::crypto::{KeyError, Keypair};
use crate::error::ErrorKind;

impl KeyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KeyError::Generation(_) => ErrorKind::KeyGeneration,
            KeyError::Export(_) => ErrorKind::KeyExport,
            KeyError::Import(_) => ErrorKind::KeyImport,
        }
    }
}

/// Generate the requestor keypair on the blocking pool
pub async fn generate_keypair() -> Result<Keypair, KeyError> {
    let keypair = tokio::task::spawn_blocking(Keypair::generate)
        .await
        .map_err(|e| KeyError::Generation(e.to_string()))??;
    tracing::debug!(public_key = ?keypair.public(), "generated requestor keypair");
    Ok(keypair)
}

/// Export the public half of `keypair` as SPKI DER
pub async fn export_public_key(keypair: &Keypair) -> Result<Vec<u8>, KeyError> {
    let public = *keypair.public();
    tokio::task::spawn_blocking(move || public.to_spki().to_vec())
        .await
        .map_err(|e| KeyError::Export(e.to_string()))
}
