use thiserror::Error;

/// Failures surfaced by a gateway operation.
///
/// The store never branches on the variant; it keeps the rendered message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Server rejected request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl SyncError {
    /// HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Server { status, .. } => Some(*status),
            SyncError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}
