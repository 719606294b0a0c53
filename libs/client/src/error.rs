use reqwest::StatusCode;

/// Errors surfaced by the request pipeline.
///
/// Only 401 handling happens inside the pipeline; every other failing status
/// propagates unchanged as [`ApiError::Status`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error("failed to serialize request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("credential store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl ApiError {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Terminal outcomes of a token refresh attempt.
///
/// Cloneable so a single failure fans out to every caller queued behind the
/// in-flight refresh.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token in store")]
    MissingRefreshToken,
    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },
    #[error("refresh transport error: {0}")]
    Transport(String),
    #[error("credential store failure: {0}")]
    Storage(String),
    #[error("refresh abandoned before completion")]
    Abandoned,
}
