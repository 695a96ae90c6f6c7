use clap::Args;
use url::Url;

use common::codec::link;

use super::request::{Request, RequestError};
use super::send::{SendSecret, SendSecretError};
use crate::cli::op::Op;

/// Open a hush URL: send a secret if it carries a key, otherwise request one on it
#[derive(Args, Debug, Clone)]
pub struct Open {
    /// A share link, or the base URL to build a new share link on
    pub url: Url,

    /// The secret to share when the URL is a share link
    #[arg(long, conflicts_with = "paste")]
    pub secret: Option<String>,

    /// Read the secret from the clipboard when the URL is a share link
    #[arg(long)]
    pub paste: bool,

    /// Copy results to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// When requesting, exit after the first secret is decrypted
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Send,
    Request,
}

impl Mode {
    /// A non-empty `key` parameter makes the holder a sender
    pub fn of(url: &Url) -> Self {
        if link::key_param(url).is_some() {
            Mode::Send
        } else {
            Mode::Request
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    Send(#[from] SendSecretError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

#[async_trait::async_trait]
impl Op for Open {
    type Error = OpenError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mode = Mode::of(&self.url);
        tracing::debug!(?mode, "opening url");

        match mode {
            Mode::Send => {
                let send = SendSecret {
                    link: self.url.to_string(),
                    secret: self.secret.clone(),
                    paste: self.paste,
                    copy: self.copy,
                };
                Ok(send.execute(ctx).await?)
            }
            Mode::Request => {
                let request = Request {
                    once: self.once,
                    copy: self.copy,
                    explain: false,
                    base_url: Some(self.url.clone()),
                };
                Ok(request.execute(ctx).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cli::op::OpContext;
    use common::crypto::Keypair;
    use common::pipeline::{Decrypt, Receiver};

    #[test]
    fn test_mode_selection() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert_eq!(Mode::of(&url("hush://share/?key=AAAA")), Mode::Send);
        assert_eq!(Mode::of(&url("https://a.example/x?lang=en&key=AAAA")), Mode::Send);
        assert_eq!(Mode::of(&url("hush://share/")), Mode::Request);
        assert_eq!(Mode::of(&url("hush://share/?key=")), Mode::Request);
        assert_eq!(Mode::of(&url("https://a.example/?keys=AAAA")), Mode::Request);
    }

    #[tokio::test]
    async fn test_open_share_link_sends() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = OpContext::new(Some(dir.path().to_path_buf())).unwrap();
        let keypair = Arc::new(Keypair::generate().unwrap());
        let url = link::share_url(
            &Url::parse("https://hush.example/").unwrap(),
            &keypair.public().to_spki(),
        );

        let open = Open {
            url,
            secret: Some("opened".to_string()),
            paste: false,
            copy: false,
            once: false,
        };
        let token = open.execute(&ctx).await.unwrap();
        assert_eq!(
            Receiver::new(keypair).decrypt(&token).await.unwrap(),
            "opened"
        );
    }
}
