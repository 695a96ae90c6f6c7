use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use common::session::{DecryptState, DecryptView, RequestorSession, SessionError};

/// Typed on its own line, reads the next payload from the clipboard
pub const PASTE_COMMAND: &str = ":paste";

pub const EXPLAINER: &str = "\
How this works

1. The requestor generates a keypair: a public key and a private key. The
   public key is encoded into the link given to the sender.
2. The sender generates a one-time symmetric encryption key.
3. The sender encrypts their secret with the symmetric key, and wraps the
   symmetric key with the requestor's public key.
4. The requestor unwraps the symmetric key with their private key and
   decrypts the secret with it.

The intermediate symmetric key is needed because the public key can only
protect a short value, not an arbitrary secret.

Nothing is stored or sent anywhere by hush. The private key only lives in
the running `hush request` process; links and messages only travel when you
copy them.";

/// Ask someone for a secret: print a share link, then decrypt what they send back
#[derive(Args, Debug, Clone)]
pub struct Request {
    /// Exit after the first secret is decrypted
    #[arg(long)]
    pub once: bool,

    /// Copy the share link, and each decrypted secret, to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Explain how the exchange works and exit
    #[arg(long)]
    pub explain: bool,

    /// Base URL for the share link (defaults to the configured one)
    #[arg(long)]
    pub base_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{}", .0.kind())]
    Session(#[from] SessionError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input closed before a secret was decrypted")]
    NoSecret,
}

/// What a slot update means for the terminal
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Nothing,
    Secret(String),
    Problem(&'static str),
}

fn report(view: &DecryptView) -> Report {
    match &view.state {
        DecryptState::Idle | DecryptState::Decrypting => Report::Nothing,
        DecryptState::Decrypted(secret) => Report::Secret(secret.clone()),
        DecryptState::Failed(e) => Report::Problem(e.kind().user_message()),
    }
}

impl Request {
    /// Show the outcome of one settled attempt, returning the secret if there is one
    async fn deliver(&self, ctx: &crate::cli::op::OpContext, view: &DecryptView) -> Option<String> {
        match report(view) {
            Report::Nothing => None,
            Report::Problem(message) => {
                eprintln!("{}", message);
                None
            }
            Report::Secret(secret) => {
                if self.copy {
                    eprintln!("{}", ctx.clipboard.copy_with_feedback(secret.clone()).await);
                }
                // with --once the secret is the command's output instead
                if !self.once {
                    println!("{}", secret);
                }
                Some(secret)
            }
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Request {
    type Error = RequestError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.explain {
            return Ok(EXPLAINER.to_string());
        }

        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| ctx.state.config.base_url.clone());

        eprintln!("Creating key");
        let session = RequestorSession::start(base_url);
        let share_link = session.share_link().wait().await?;

        eprintln!("Share this link with the person who knows the secret:\n");
        eprintln!("  {}\n", share_link);
        if self.copy {
            eprintln!("{}", ctx.clipboard.copy_with_feedback(share_link.to_string()).await);
        }
        eprintln!(
            "Keep this command running, you need it to read the message they'll send back. \
             If you stop it, send a new link."
        );

        let slot = session
            .decrypt_slot()
            .await?
            .with_debounce(ctx.state.config.decrypt_debounce());
        let mut updates = slot.subscribe();
        eprintln!(
            "Paste the message you receive from the secret knower and press enter \
             (or type {PASTE_COMMAND} to read it from the clipboard)."
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut last_secret = None;
        let mut reported = 0;
        loop {
            let view = tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        // input closed; let a pending attempt finish before ending the session
                        let view = slot.settled().await;
                        if view.generation != reported {
                            if let Some(secret) = self.deliver(ctx, &view).await {
                                last_secret = Some(secret);
                            }
                        }
                        break;
                    };
                    let input = if line.trim() == PASTE_COMMAND {
                        match ctx.clipboard.paste().await {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::warn!("clipboard paste failed: {}", e);
                                eprintln!("{}", e.kind().user_message());
                                continue;
                            }
                        }
                    } else {
                        line
                    };
                    let generation = slot.submit(input);
                    tracing::debug!(generation, "payload submitted");
                    continue;
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    updates.borrow_and_update().clone()
                }
            };

            if report(&view) != Report::Nothing {
                reported = view.generation;
            }
            if let Some(secret) = self.deliver(ctx, &view).await {
                last_secret = Some(secret);
                if self.once {
                    break;
                }
            }
        }

        // the slot shares the keypair, so it goes before the session
        drop(updates);
        drop(slot);
        drop(session);
        tracing::debug!("session keys discarded");

        match (self.once, last_secret) {
            (true, Some(secret)) => Ok(secret),
            (true, None) => Err(RequestError::NoSecret),
            // secrets were already printed as they arrived
            (false, _) => Ok(String::new()),
        }
    }
}
