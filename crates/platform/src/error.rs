use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown window `{0}`")]
    UnknownWindow(String),
    #[error("invalid notification permission mode `{0}` (expected granted, denied or prompt)")]
    InvalidPermissionMode(String),
    #[error("not a text file: {0}")]
    NotText(String),
}
