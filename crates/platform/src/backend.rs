use async_trait::async_trait;
use orchestrator::providers::Backend;
use serde_json::Value;
use shared::{domain::Command, error::BackendError};

/// Runs backend commands on the blocking pool of the current runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessBackend;

#[async_trait]
impl Backend for InProcessBackend {
    async fn invoke(&self, command: Command) -> Result<Value, BackendError> {
        tokio::task::spawn_blocking(move || backend::dispatch(&command))
            .await
            .unwrap_or_else(|err| {
                Err(BackendError::new(
                    shared::error::ErrorCode::Internal,
                    format!("backend task failed: {err}"),
                ))
            })
    }
}
