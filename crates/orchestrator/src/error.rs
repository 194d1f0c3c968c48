use thiserror::Error;

pub const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Input rejected locally; the backend was never contacted.
    #[error("{0}")]
    Validation(String),
    /// Reason reported by the backend, kept verbatim.
    #[error("{0}")]
    Backend(String),
    #[error("unexpected response from `{command}`: {reason}")]
    Decode { command: String, reason: String },
}

impl GatewayError {
    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn is_local(&self) -> bool {
        matches!(self, GatewayError::Validation(_))
    }
}

/// Renders a provider error for the user, falling back to [`UNKNOWN_ERROR`]
/// only when the error has no text at all.
pub fn error_message(err: &anyhow::Error) -> String {
    non_empty_or_unknown(format!("{err:#}"))
}

pub(crate) fn non_empty_or_unknown(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}
