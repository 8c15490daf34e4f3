use thiserror::Error;

/// Message used when a failed response carries neither an `error` field nor a
/// status text.
pub const FALLBACK_MESSAGE: &str = "request failed";

/// Every way a client operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },
    /// A token-protected operation was invoked while logged out.
    #[error("not authenticated")]
    NotAuthenticated,
    /// A 2xx body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
