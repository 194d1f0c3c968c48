use anyhow::Result;
use backend::shell::{self, MenuRoute};
use orchestrator::providers::EventSource;
use shared::protocol::{BackendEvent, WindowEvent};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// In-process channel for backend-originated events.
#[derive(Clone)]
pub struct EventBus {
    backend: broadcast::Sender<BackendEvent>,
    window: broadcast::Sender<WindowEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (backend, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (window, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { backend, window }
    }

    /// Sender the window provider publishes geometry and focus changes on.
    pub fn window_publisher(&self) -> broadcast::Sender<WindowEvent> {
        self.window.clone()
    }

    pub fn emit(&self, event: BackendEvent) {
        if self.backend.send(event).is_err() {
            tracing::debug!("backend event dropped; no listeners");
        }
    }

    /// Routes a native menu selection, forwarding it to listeners when it
    /// maps to a front-end action.
    pub fn menu_selected(&self, id: &str) -> MenuRoute {
        let route = shell::route_menu_event(id);
        if let MenuRoute::Emit(event) = &route {
            self.emit(event.clone());
        }
        route
    }
}

impl EventSource for EventBus {
    fn listen(&self, event: &str) -> Result<broadcast::Receiver<BackendEvent>> {
        tracing::debug!(%event, "subscribing to backend events");
        Ok(self.backend.subscribe())
    }

    fn window_events(&self) -> Result<broadcast::Receiver<WindowEvent>> {
        Ok(self.window.subscribe())
    }
}
