// src/error.rs
use thiserror::Error;

/// Which upstream feed a fetch error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Top,
    Border,
}

impl Feed {
    pub fn as_str(self) -> &'static str {
        match self {
            Feed::Top => "top100",
            Feed::Border => "border",
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{feed} feed request failed: {message}")]
    Transport { feed: Feed, message: String },

    #[error("{feed} feed returned status {status}")]
    Status { feed: Feed, status: u16 },

    #[error("{feed} feed body is not a valid ranking payload: {message}")]
    Parse { feed: Feed, message: String },
}

impl FetchError {
    pub fn feed(&self) -> Feed {
        match self {
            FetchError::Transport { feed, .. }
            | FetchError::Status { feed, .. }
            | FetchError::Parse { feed, .. } => *feed,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store network error: {0}")]
    Network(String),

    #[error("store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("store response parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("reading resident event id failed: {0}")]
    Read(#[source] StoreError),

    #[error("deleting rows of previous event failed: {0}")]
    Delete(#[source] StoreError),
}

#[derive(Debug, Error)]
#[error("inserting ranking snapshot failed: {0}")]
pub struct WriteError(#[from] pub StoreError);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl PipelineError {
    /// Last stage the run reached before failing.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Guard(_) => "guard",
            PipelineError::Write(_) => "write",
        }
    }
}
