use clap::Args;
use url::Url;

use crate::state::{AppConfig, AppState, DEFAULT_BASE_URL};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Base URL for share links
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Never touch the system clipboard
    #[arg(long)]
    pub no_clipboard: bool,

    /// Default log level for stderr output
    #[arg(long, default_value = "warn")]
    pub log_level: tracing::Level,

    /// Delay before a pasted payload is decrypted, in milliseconds
    #[arg(long, default_value_t = 150)]
    pub decrypt_debounce_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            base_url: self.base_url.clone(),
            clipboard: !self.no_clipboard,
            log_level: self.log_level.to_string().to_lowercase(),
            decrypt_debounce_ms: self.decrypt_debounce_ms,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized hush directory at: {}\n\
             - Config: {}\n\
             - Share link base: {}\n\
             - Clipboard: {}\n\
             - Log level: {}\n\
             - Decrypt debounce: {}ms",
            state.hush_dir.display(),
            state.config_path.display(),
            state.config.base_url,
            if state.config.clipboard { "enabled" } else { "disabled" },
            state.config.log_level,
            state.config.decrypt_debounce_ms,
        );

        Ok(output)
    }
}
