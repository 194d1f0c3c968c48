use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnknownCommand,
    InvalidArguments,
    InvalidNumber,
    OutOfRange,
    UnsupportedOperation,
    DivisionByZero,
    Internal,
}

/// Failure reported by a backend command. `message` is user-facing and is
/// surfaced verbatim by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct BackendError {
    pub code: ErrorCode,
    pub message: String,
}

impl BackendError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorCode::DivisionByZero, "division by zero is not allowed")
    }

    pub fn invalid_arguments(command: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidArguments,
            format!("invalid arguments for command `{command}`: {reason}"),
        )
    }
}
