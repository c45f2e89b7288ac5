use thiserror::Error;

/// Everything that can go wrong between the host request and the gateway
/// reply. All variants are caught at the [`crate::Pipe`] boundary and turned
/// into a user-facing string.
#[derive(Debug, Error)]
pub enum PipeError {
    #[error("missing required setting: {0}")]
    ConfigIncomplete(&'static str),
    #[error("no API key available")]
    NoKeyAvailable,
    #[error("no parsable message content")]
    NoParsableContent,
    #[error("gateway returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl PipeError {
    /// Render for the host. Always starts with `Error: `; the detail behind
    /// an [`PipeError::Unexpected`] stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            PipeError::Unexpected(_) => "Error: the gateway call failed unexpectedly".to_string(),
            other => format!("Error: {other}"),
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            PipeError::Timeout(timeout_secs)
        } else {
            PipeError::Unexpected(err.to_string())
        }
    }
}
