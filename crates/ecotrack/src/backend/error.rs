/// Failure talking to one of the external services.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("invalid backend URL '{0}'")]
    InvalidUrl(String),
}

impl BackendError {
    /// Whether retrying the same call later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Rejected(_) | Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}
