use std::error::Error;
use std::path::PathBuf;

use crate::clipboard::Clipboard;
use crate::state::{AppState, StateError};

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.hush)
    pub config_path: Option<PathBuf>,
    /// Loaded state; defaults when no config file exists yet
    pub state: AppState,
    /// Clipboard access, disabled by config
    pub clipboard: Clipboard,
}

impl OpContext {
    /// Create context from an optional config path
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, StateError> {
        let state = AppState::load(config_path.clone())?;
        let clipboard = Clipboard::new(state.config.clipboard);
        Ok(Self {
            config_path,
            state,
            clipboard,
        })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_without_config_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = OpContext::new(Some(dir.path().join("missing"))).unwrap();
        assert_eq!(ctx.state.config, crate::state::AppConfig::default());
        assert_eq!(ctx.clipboard.is_enabled(), ctx.state.config.clipboard);
    }
}
