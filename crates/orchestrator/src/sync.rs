//! Observable view state and the event subscriptions feeding it.
//!
//! Action outcomes are written through [`ViewStore::apply`] tagged with the
//! generation handed out by [`ViewStore::begin`]; an outcome older than one
//! already applied for the same [`ActionKind`] is dropped, as is anything
//! arriving after the session ended.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use futures::StreamExt;
use shared::{
    domain::{DirectoryListing, MessageKind, PermissionState, Statistics, WindowSize},
    protocol::{MenuAction, WindowEvent, MENU_ACTION_EVENT},
};
use tokio::{sync::RwLock, task::JoinHandle};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::{
    error::error_message,
    notify::DispatchOutcome,
    providers::EventSource,
    workflow::{WorkflowEngine, WorkflowKind, WorkflowState},
};

pub const UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub greeting: Option<Result<String, String>>,
    pub calculation: Option<Result<String, String>>,
    pub division: Option<Result<String, String>>,
    pub statistics: Option<Result<Statistics, String>>,
    pub timestamp: Option<u64>,
    pub local_time: String,
    pub system_info: String,
    pub window_title: String,
    pub window_size: Option<WindowSize>,
    pub focused: bool,
    pub secondary_visible: bool,
    pub file_path: Option<PathBuf>,
    pub file_dirty: bool,
    pub directory: Option<DirectoryListing>,
    pub path_exists: Option<bool>,
    pub permission: PermissionState,
    pub last_notification: Option<DispatchOutcome>,
    pub last_menu_action: Option<MenuAction>,
    /// Menu selections handled so far, counted once their dialog was shown.
    pub menu_selections: u64,
    pub last_workflow: Option<(WorkflowKind, WorkflowState)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Greeting,
    Calculation,
    Division,
    Statistics,
    Timestamp,
    SystemInfo,
    File,
    Directory,
    PathCheck,
    Notification,
    Window,
    Workflow(WorkflowKind),
}

pub type Generation = u64;

#[derive(Default)]
struct StoreInner {
    state: ViewState,
    issued: HashMap<ActionKind, Generation>,
    applied: HashMap<ActionKind, Generation>,
    ended: bool,
}

#[derive(Default)]
pub struct ViewStore {
    inner: RwLock<StoreInner>,
}

impl ViewStore {
    pub fn new(initial: ViewState) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                state: initial,
                ..StoreInner::default()
            }),
        }
    }

    pub async fn snapshot(&self) -> ViewState {
        self.inner.read().await.state.clone()
    }

    pub async fn begin(&self, kind: ActionKind) -> Generation {
        let mut inner = self.inner.write().await;
        let next = inner.issued.get(&kind).copied().unwrap_or(0) + 1;
        inner.issued.insert(kind, next);
        next
    }

    /// Applies `update` unless a newer generation of `kind` was already
    /// applied or the session has ended. Returns whether it was applied.
    pub async fn apply<F>(&self, kind: ActionKind, generation: Generation, update: F) -> bool
    where
        F: FnOnce(&mut ViewState),
    {
        let mut inner = self.inner.write().await;
        if inner.ended {
            tracing::debug!(?kind, generation, "session ended; discarding outcome");
            return false;
        }
        if let Some(&latest) = inner.applied.get(&kind) {
            if generation < latest {
                tracing::debug!(?kind, generation, latest, "discarding stale outcome");
                return false;
            }
        }
        inner.applied.insert(kind, generation);
        update(&mut inner.state);
        true
    }

    pub async fn reduce<F>(&self, update: F) -> bool
    where
        F: FnOnce(&mut ViewState),
    {
        let mut inner = self.inner.write().await;
        if inner.ended {
            return false;
        }
        update(&mut inner.state);
        true
    }

    pub async fn end(&self) {
        self.inner.write().await.ended = true;
    }

    pub async fn is_ended(&self) -> bool {
        self.inner.read().await.ended
    }
}

pub fn menu_dialog(action: &MenuAction) -> Option<(&'static str, &'static str)> {
    let dialog = match action {
        MenuAction::New => ("File", "New file"),
        MenuAction::Open => ("File", "Open file"),
        MenuAction::Save => ("File", "Save file"),
        MenuAction::SaveAs => ("File", "Save as"),
        MenuAction::Undo => ("Edit", "Undo"),
        MenuAction::Redo => ("Edit", "Redo"),
        MenuAction::Cut => ("Edit", "Cut"),
        MenuAction::Copy => ("Edit", "Copy"),
        MenuAction::Paste => ("Edit", "Paste"),
        MenuAction::ZoomIn => ("View", "Zoom in"),
        MenuAction::ZoomOut => ("View", "Zoom out"),
        MenuAction::ZoomReset => ("View", "Reset zoom"),
        MenuAction::About => (
            "About",
            "Deskflow\nVersion 1.0.0\n\nA desktop command and workflow playground.",
        ),
        MenuAction::Unrecognized(_) => return None,
    };
    Some(dialog)
}

pub struct Subscription {
    name: &'static str,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::debug!(subscription = self.name, "releasing subscription");
        self.task.abort();
    }
}

pub struct ViewStateSynchronizer;

impl ViewStateSynchronizer {
    /// Subscribes to menu actions and window events. A subscription that
    /// cannot be established is logged and skipped.
    pub fn attach(
        events: &dyn EventSource,
        store: Arc<ViewStore>,
        engine: WorkflowEngine,
    ) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(2);

        match events.listen(MENU_ACTION_EVENT) {
            Ok(receiver) => subscriptions.push(Subscription {
                name: "menu-action",
                task: spawn_menu_listener(receiver, Arc::clone(&store), engine),
            }),
            Err(err) => tracing::warn!(
                error = %error_message(&err),
                "menu action subscription unavailable; continuing without it"
            ),
        }

        match events.window_events() {
            Ok(receiver) => subscriptions.push(Subscription {
                name: "window",
                task: spawn_window_listener(receiver, store),
            }),
            Err(err) => tracing::warn!(
                error = %error_message(&err),
                "window event subscription unavailable; continuing without it"
            ),
        }

        subscriptions
    }
}

fn spawn_menu_listener(
    receiver: tokio::sync::broadcast::Receiver<shared::protocol::BackendEvent>,
    store: Arc<ViewStore>,
    engine: WorkflowEngine,
) -> JoinHandle<()> {
    let mut stream = BroadcastStream::new(receiver);
    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            let event = match item {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "menu listener lagged");
                    continue;
                }
            };
            if event.name != MENU_ACTION_EVENT {
                continue;
            }

            let action = MenuAction::from_payload(&event.payload);
            let Some((title, text)) = menu_dialog(&action) else {
                tracing::warn!(action = action.id(), "unrecognized menu action");
                continue;
            };
            tracing::debug!(action = action.id(), "menu action received");
            if store.is_ended().await {
                break;
            }
            engine.inform(MessageKind::Info, title, text).await;
            let recorded = store
                .reduce(|state| {
                    state.last_menu_action = Some(action);
                    state.menu_selections += 1;
                })
                .await;
            if !recorded {
                break;
            }
        }
    })
}

fn spawn_window_listener(
    receiver: tokio::sync::broadcast::Receiver<WindowEvent>,
    store: Arc<ViewStore>,
) -> JoinHandle<()> {
    let mut stream = BroadcastStream::new(receiver);
    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            let event = match item {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "window listener lagged");
                    continue;
                }
            };
            let applied = store
                .reduce(|state| match event {
                    WindowEvent::Resized(size) => state.window_size = Some(size),
                    WindowEvent::FocusChanged(focused) => state.focused = focused,
                })
                .await;
            if !applied {
                break;
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
