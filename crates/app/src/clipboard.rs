//! Best-effort access to the system clipboard
//!
//! Every operation opens its own handle, so a missing display server or a
//! locked clipboard only fails the one copy or paste that hit it.

use common::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard integration is disabled in config")]
    Disabled,

    #[error("clipboard unavailable: {0}")]
    Unavailable(#[from] arboard::Error),

    #[error("clipboard task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ClipboardError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ClipboardAccess
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Clipboard {
    enabled: bool,
}

impl Clipboard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn copy(&self, text: String) -> Result<(), ClipboardError> {
        if !self.enabled {
            return Err(ClipboardError::Disabled);
        }
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)
        })
        .await??;
        Ok(())
    }

    pub async fn paste(&self) -> Result<String, ClipboardError> {
        if !self.enabled {
            return Err(ClipboardError::Disabled);
        }
        let text = tokio::task::spawn_blocking(|| {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.get_text()
        })
        .await??;
        Ok(text)
    }

    /// Copy `text` and describe the outcome for the user
    pub async fn copy_with_feedback(&self, text: String) -> String {
        match self.copy(text).await {
            Ok(()) => "Copied!".to_string(),
            Err(e) => {
                tracing::warn!("clipboard copy failed: {}", e);
                e.kind().user_message().to_string()
            }
        }
    }
}
