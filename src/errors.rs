use bsync_config::ConfigError;
use bsync_core::SyncError;
use thiserror::Error;

/// Any failure surfaced by the client facade.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// HTTP status when the failure came back from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Sync(err) => err.status(),
            ClientError::Config(_) => None,
        }
    }
}
