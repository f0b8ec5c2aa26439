use thiserror::Error;

/// Snapshot retrieval failure. Terminal for the session: the projection
/// moves to its failed state and no retry happens inside the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("projects request failed: {0}")]
    Transport(String),
    /// Non-success status; `message` is the server-provided message when the
    /// body carried one, else a generic description.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("projects response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("push stream connect failed: {0}")]
    Connect(String),
    #[error("push stream transport failed: {0}")]
    Transport(String),
}
