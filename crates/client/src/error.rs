use thiserror::Error;

/// Failure of a backend call. None of these are fatal; callers turn them
/// into notices and keep their previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection refused, timeout, DNS, ...
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-2xx response. `message` is the backend's `{"message": ..}` when present.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
