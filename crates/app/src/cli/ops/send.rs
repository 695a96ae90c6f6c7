use std::io::IsTerminal;

use clap::Args;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

use common::pipeline::{SendError, Sender};

use crate::clipboard::ClipboardError;

/// Encrypt a secret for the person who sent you a link
#[derive(Args, Debug, Clone)]
pub struct SendSecret {
    /// The share link (or bare key token) you were given
    pub link: String,

    /// The secret to share (read from stdin when omitted)
    #[arg(long, conflicts_with = "paste")]
    pub secret: Option<String>,

    /// Read the secret from the clipboard
    #[arg(long)]
    pub paste: bool,

    /// Copy the encrypted message to the clipboard
    #[arg(long)]
    pub copy: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SendSecretError {
    #[error("{}", .0.kind())]
    Send(#[from] SendError),

    #[error("{}", .0.kind())]
    Clipboard(#[from] ClipboardError),

    #[error("failed to read secret: {0}")]
    Io(#[from] std::io::Error),

    #[error("no secret given, enter the secret you want to share")]
    EmptySecret,
}

impl SendSecret {
    async fn read_secret(&self, ctx: &crate::cli::op::OpContext) -> Result<String, SendSecretError> {
        if let Some(secret) = &self.secret {
            return Ok(secret.clone());
        }
        if self.paste {
            return Ok(ctx.clipboard.paste().await?);
        }
        read_stdin_secret().await
    }
}

/// Read one line from a terminal, or everything from a pipe
async fn read_stdin_secret() -> Result<String, SendSecretError> {
    if std::io::stdin().is_terminal() {
        eprintln!("Enter the secret you want to share:");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        return Ok(lines.next_line().await?.unwrap_or_default());
    }

    let mut secret = String::new();
    tokio::io::stdin().read_to_string(&mut secret).await?;
    Ok(strip_line_ending(&secret).to_string())
}

/// Drop the single line ending a shell pipe appends
fn strip_line_ending(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}

#[async_trait::async_trait]
impl crate::cli::op::Op for SendSecret {
    type Error = SendSecretError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // a broken link is reported before asking for the secret
        eprintln!("Parsing key from link");
        let sender = Sender::from_link(&self.link).await?;
        tracing::debug!(public_key = ?sender.public_key(), "imported requestor key");

        let secret = self.read_secret(ctx).await?;
        if secret.is_empty() {
            return Err(SendSecretError::EmptySecret);
        }

        eprintln!("Preparing encryption key");
        let payload = sender.seal(&secret).await?;
        let token = payload
            .encode()
            .map_err(|e| SendError::Encryption(e.to_string()))?;

        if self.copy {
            eprintln!("{}", ctx.clipboard.copy_with_feedback(token.clone()).await);
        }
        eprintln!("Send this encrypted message back to the person who needs the secret.");

        Ok(token)
    }
}
