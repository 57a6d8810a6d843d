use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrueVaultError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("TrueVault returned error ({status}): {body}")]
    Status {
        status: u16,
        body: String,
        response_data: Option<serde_json::Value>,
    },

    #[error("TrueVault request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`TrueVaultError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client was constructed or called with unusable input
    InvalidArgument,
    /// The request failed on the wire or came back unusable
    Transport,
}

impl TrueVaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrueVaultError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            _ => ErrorKind::Transport,
        }
    }

    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            TrueVaultError::Status { status, .. } => Some(*status),
            TrueVaultError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
