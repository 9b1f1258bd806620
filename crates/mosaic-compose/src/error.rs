use thiserror::Error;

/// Failure reported by a composer function.
///
/// The worker logs these and keeps serving the last good frame.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Input needed to draw the screen is not available yet.
    #[error("missing data: {0}")]
    MissingData(String),

    /// The state handed to the composer cannot be drawn.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ComposeError {
    pub fn missing(what: impl Into<String>) -> Self {
        ComposeError::MissingData(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        ComposeError::InvalidState(what.into())
    }
}
