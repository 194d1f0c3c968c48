use std::sync::Arc;

use shared::{
    domain::{MessageKind, WindowSize},
    protocol::SECONDARY_WINDOW_LABEL,
};

use crate::{
    error::error_message,
    providers::WindowControl,
    workflow::{WorkflowEngine, ERROR_TITLE},
};

#[derive(Clone)]
pub struct WindowController {
    window: Arc<dyn WindowControl>,
    engine: WorkflowEngine,
}

impl WindowController {
    pub fn new(window: Arc<dyn WindowControl>, engine: WorkflowEngine) -> Self {
        Self { window, engine }
    }

    pub async fn set_title(&self, title: &str) -> Result<(), String> {
        let result = self.window.set_title(title).await;
        self.report("Failed to set window title", result).await
    }

    pub async fn set_size(&self, size: &str) -> Result<WindowSize, String> {
        let parsed = match size.parse::<WindowSize>() {
            Ok(parsed) => parsed,
            Err(reason) => {
                return self
                    .report("Failed to set window size", Err(anyhow::anyhow!(reason)))
                    .await
            }
        };
        let result = self.window.set_size(parsed).await.map(|()| parsed);
        self.report("Failed to set window size", result).await
    }

    pub async fn center(&self) -> Result<(), String> {
        let result = self.window.center().await;
        self.report("Failed to center window", result).await
    }

    pub async fn toggle_secondary(&self) -> Result<bool, String> {
        let result = async {
            let visible = self.window.is_visible(SECONDARY_WINDOW_LABEL).await?;
            self.window
                .set_visible(SECONDARY_WINDOW_LABEL, !visible)
                .await?;
            Ok::<_, anyhow::Error>(!visible)
        }
        .await;
        self.report("Failed to toggle secondary window", result).await
    }

    async fn report<T>(&self, context: &str, result: anyhow::Result<T>) -> Result<T, String> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                let reason = error_message(&err);
                tracing::error!(%context, %reason, "window operation failed");
                self.engine
                    .inform(MessageKind::Error, ERROR_TITLE, &format!("{context}: {reason}"))
                    .await;
                Err(reason)
            }
        }
    }
}
