use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use backend::shell::{self, CloseDecision, TrayCommand};
use orchestrator::providers::WindowControl;
use shared::{
    domain::WindowSize,
    protocol::{WindowEvent, MAIN_WINDOW_LABEL, SECONDARY_WINDOW_LABEL},
};
use tokio::sync::{broadcast, Mutex};

use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGeometry {
    pub title: String,
    pub size: WindowSize,
    pub centered: bool,
    visible: HashMap<&'static str, bool>,
}

impl WindowGeometry {
    pub fn is_visible(&self, label: &str) -> bool {
        self.visible.get(label).copied().unwrap_or(false)
    }
}

/// Window manager without a display. Tracks geometry and visibility of the
/// main and secondary windows and publishes resize and focus events.
pub struct HeadlessWindow {
    state: Mutex<WindowGeometry>,
    events: broadcast::Sender<WindowEvent>,
}

impl HeadlessWindow {
    pub fn new(
        title: impl Into<String>,
        size: WindowSize,
        events: broadcast::Sender<WindowEvent>,
    ) -> Self {
        let visible = HashMap::from([(MAIN_WINDOW_LABEL, true), (SECONDARY_WINDOW_LABEL, false)]);
        Self {
            state: Mutex::new(WindowGeometry {
                title: title.into(),
                size,
                centered: false,
                visible,
            }),
            events,
        }
    }

    pub async fn geometry(&self) -> WindowGeometry {
        self.state.lock().await.clone()
    }

    /// Applies the close-request policy; returns whether the window is gone.
    pub async fn request_close(&self, label: &str) -> Result<bool> {
        let key = known_label(label)?;
        let decision = shell::close_request_policy(key);
        self.set_visible(key, false).await?;
        tracing::debug!(window = key, ?decision, "close requested");
        Ok(decision == CloseDecision::Close)
    }

    /// Left click on the tray icon.
    pub async fn tray_click(&self) -> Result<TrayCommand> {
        let visible = self.is_visible(MAIN_WINDOW_LABEL).await?;
        let command = shell::tray_left_click(visible);
        self.apply_tray(command).await?;
        Ok(command)
    }

    /// Runs a tray command. `Quit` is left to the caller.
    pub async fn apply_tray(&self, command: TrayCommand) -> Result<()> {
        match command {
            TrayCommand::ShowMainWindow => self.set_visible(MAIN_WINDOW_LABEL, true).await,
            TrayCommand::HideMainWindow => self.set_visible(MAIN_WINDOW_LABEL, false).await,
            TrayCommand::Quit => Ok(()),
        }
    }

    fn publish(&self, event: WindowEvent) {
        // No subscribers is fine; the view simply is not attached.
        let _ = self.events.send(event);
    }
}

fn known_label(label: &str) -> Result<&'static str> {
    match label {
        MAIN_WINDOW_LABEL => Ok(MAIN_WINDOW_LABEL),
        SECONDARY_WINDOW_LABEL => Ok(SECONDARY_WINDOW_LABEL),
        other => Err(ProviderError::UnknownWindow(other.to_string()).into()),
    }
}

#[async_trait]
impl WindowControl for HeadlessWindow {
    async fn set_title(&self, title: &str) -> Result<()> {
        self.state.lock().await.title = title.to_string();
        Ok(())
    }

    async fn set_size(&self, size: WindowSize) -> Result<()> {
        self.state.lock().await.size = size;
        self.publish(WindowEvent::Resized(size));
        Ok(())
    }

    async fn center(&self) -> Result<()> {
        self.state.lock().await.centered = true;
        Ok(())
    }

    async fn is_visible(&self, label: &str) -> Result<bool> {
        let key = known_label(label)?;
        Ok(self.state.lock().await.is_visible(key))
    }

    async fn set_visible(&self, label: &str, visible: bool) -> Result<()> {
        let key = known_label(label)?;
        self.state.lock().await.visible.insert(key, visible);
        if key == MAIN_WINDOW_LABEL {
            self.publish(WindowEvent::FocusChanged(visible));
        }
        Ok(())
    }
}
