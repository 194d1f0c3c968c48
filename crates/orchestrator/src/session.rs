//! The explicit per-session state every user action runs against.
//!
//! A [`Session`] is created once with its providers, owns the open-file slot,
//! the permission gate and the view store, and is torn down with
//! [`Session::end`] (or by dropping it), which releases its subscriptions.

use std::{sync::Arc, time::Duration};

use shared::domain::{
    DirectoryListing, FileHandle, MessageKind, NotificationCategory, Operation, PermissionState,
    Statistics, WindowSize, DEFAULT_NOTIFICATION_BODY,
};
use tokio::sync::Mutex;

use crate::{
    error::GatewayError,
    files::FileWorkflows,
    gateway::{Calculation, CommandGateway, Timestamp},
    notify::{DispatchOutcome, NotificationDispatcher},
    permission::PermissionGate,
    providers::{Backend, Dialogs, EventSource, FileSystem, NotificationPlatform, WindowControl},
    sync::{ActionKind, Subscription, ViewState, ViewStateSynchronizer, ViewStore, UNAVAILABLE},
    window::WindowController,
    workflow::{self, WorkflowEngine, WorkflowKind, WorkflowReport},
};

#[derive(Clone)]
pub struct Providers {
    pub backend: Arc<dyn Backend>,
    pub fs: Arc<dyn FileSystem>,
    pub dialogs: Arc<dyn Dialogs>,
    pub notifications: Arc<dyn NotificationPlatform>,
    pub window: Arc<dyn WindowControl>,
    pub events: Arc<dyn EventSource>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub chain_delay: Duration,
    pub default_save_name: String,
    pub window_title: String,
    pub window_size: WindowSize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            chain_delay: Duration::from_millis(1000),
            default_save_name: "untitled.txt".to_string(),
            window_title: "Main Window".to_string(),
            window_size: WindowSize::new(1200, 800),
        }
    }
}

pub struct Session {
    gateway: CommandGateway,
    gate: Arc<PermissionGate>,
    engine: WorkflowEngine,
    files: FileWorkflows,
    window: WindowController,
    store: Arc<ViewStore>,
    subscriptions: Mutex<Vec<Subscription>>,
    chain_delay: Duration,
}

impl Session {
    /// Wires the components and attaches the event subscriptions. Must be
    /// called inside a tokio runtime.
    pub fn start(providers: Providers, settings: SessionSettings) -> Self {
        let gate = Arc::new(PermissionGate::new(Arc::clone(&providers.notifications)));
        let notifier = Arc::new(NotificationDispatcher::new(
            Arc::clone(&gate),
            Arc::clone(&providers.notifications),
        ));
        let engine = WorkflowEngine::new(Arc::clone(&providers.dialogs), notifier);
        let files = FileWorkflows::new(
            Arc::clone(&providers.fs),
            Arc::clone(&providers.dialogs),
            engine.clone(),
            settings.default_save_name,
        );
        let window = WindowController::new(Arc::clone(&providers.window), engine.clone());

        let store = Arc::new(ViewStore::new(ViewState {
            window_title: settings.window_title,
            window_size: Some(settings.window_size),
            ..ViewState::default()
        }));
        let subscriptions = ViewStateSynchronizer::attach(
            providers.events.as_ref(),
            Arc::clone(&store),
            engine.clone(),
        );
        tracing::info!(subscriptions = subscriptions.len(), "session started");

        Self {
            gateway: CommandGateway::new(providers.backend),
            gate,
            engine,
            files,
            window,
            store,
            subscriptions: Mutex::new(subscriptions),
            chain_delay: settings.chain_delay,
        }
    }

    pub async fn view(&self) -> ViewState {
        self.store.snapshot().await
    }

    pub async fn file(&self) -> Option<FileHandle> {
        self.files.current().await
    }

    /// Stops the subscriptions; outcomes still in flight are discarded.
    pub async fn end(&self) {
        self.store.end().await;
        let released = std::mem::take(&mut *self.subscriptions.lock().await);
        tracing::info!(subscriptions = released.len(), "session ended");
    }

    pub async fn greet(&self, name: &str) -> Result<String, GatewayError> {
        let generation = self.store.begin(ActionKind::Greeting).await;
        let result = self.gateway.greet(name).await;
        let shown = result.clone().map_err(|err| err.reason());
        self.store
            .apply(ActionKind::Greeting, generation, |state| {
                state.greeting = Some(shown)
            })
            .await;
        result
    }

    pub async fn calculate(
        &self,
        operation: Operation,
        a: &str,
        b: &str,
    ) -> Result<Calculation, GatewayError> {
        let generation = self.store.begin(ActionKind::Calculation).await;
        let result = self.gateway.calculate(operation, a, b).await;
        let shown = render(&result);
        self.store
            .apply(ActionKind::Calculation, generation, |state| {
                state.calculation = Some(shown)
            })
            .await;
        result
    }

    pub async fn safe_divide(&self, a: &str, b: &str) -> Result<Calculation, GatewayError> {
        let generation = self.store.begin(ActionKind::Division).await;
        let result = self.gateway.safe_divide(a, b).await;
        let shown = render(&result);
        self.store
            .apply(ActionKind::Division, generation, |state| {
                state.division = Some(shown)
            })
            .await;
        result
    }

    /// Clears the statistics when `input` holds no usable number.
    pub async fn process_numbers(&self, input: &str) -> Result<Option<Statistics>, GatewayError> {
        let generation = self.store.begin(ActionKind::Statistics).await;
        let result = self.gateway.process_numbers(input).await;
        let shown = match &result {
            Ok(stats) => stats.map(Ok),
            Err(err) => Some(Err(err.reason())),
        };
        self.store
            .apply(ActionKind::Statistics, generation, |state| {
                state.statistics = shown
            })
            .await;
        result
    }

    pub async fn refresh_timestamp(&self) -> Result<Timestamp, GatewayError> {
        let generation = self.store.begin(ActionKind::Timestamp).await;
        let result = self.gateway.timestamp().await;
        let (seconds, local_time) = match &result {
            Ok(timestamp) => (Some(timestamp.seconds), timestamp.formatted.clone()),
            Err(err) => {
                tracing::warn!(reason = %err, "timestamp unavailable");
                (None, UNAVAILABLE.to_string())
            }
        };
        self.store
            .apply(ActionKind::Timestamp, generation, |state| {
                state.timestamp = seconds;
                state.local_time = local_time;
            })
            .await;
        result
    }

    pub async fn system_info(&self) -> Result<String, GatewayError> {
        let generation = self.store.begin(ActionKind::SystemInfo).await;
        let result = self.gateway.system_info().await;
        let shown = result.clone().unwrap_or_else(|err| {
            tracing::warn!(reason = %err, "system info unavailable");
            UNAVAILABLE.to_string()
        });
        self.store
            .apply(ActionKind::SystemInfo, generation, |state| {
                state.system_info = shown
            })
            .await;
        result
    }

    pub async fn open(&self) -> Result<Option<FileHandle>, String> {
        let generation = self.store.begin(ActionKind::File).await;
        let result = self.files.open().await;
        self.sync_file(generation, None).await;
        result
    }

    pub async fn edit(&self, content: impl Into<String>) {
        let generation = self.store.begin(ActionKind::File).await;
        self.files.edit(content).await;
        self.sync_file(generation, None).await;
    }

    pub async fn close(&self) -> Option<FileHandle> {
        let generation = self.store.begin(ActionKind::File).await;
        let closed = self.files.close().await;
        self.sync_file(generation, None).await;
        closed
    }

    pub async fn save(&self) -> WorkflowReport {
        let generation = self.store.begin(ActionKind::File).await;
        let report = self.files.save().await;
        self.sync_file(generation, Some(&report)).await;
        report
    }

    pub async fn save_as(&self) -> WorkflowReport {
        let generation = self.store.begin(ActionKind::File).await;
        let report = self.files.save_as().await;
        self.sync_file(generation, Some(&report)).await;
        report
    }

    pub async fn delete(&self) -> WorkflowReport {
        let generation = self.store.begin(ActionKind::File).await;
        let report = self.files.delete().await;
        self.sync_file(generation, Some(&report)).await;
        report
    }

    /// Replaces the listing wholesale; a cancelled picker keeps the old one.
    pub async fn select_directory(&self) -> Result<Option<DirectoryListing>, String> {
        let generation = self.store.begin(ActionKind::Directory).await;
        let result = self.files.select_directory().await;
        if let Ok(Some(listing)) = &result {
            let listing = listing.clone();
            self.store
                .apply(ActionKind::Directory, generation, |state| {
                    state.directory = Some(listing)
                })
                .await;
        }
        result
    }

    pub async fn check_exists(&self, input: &str) -> Result<Option<bool>, String> {
        let generation = self.store.begin(ActionKind::PathCheck).await;
        let result = self.files.check_exists(input).await;
        let exists = result.clone().ok().flatten();
        self.store
            .apply(ActionKind::PathCheck, generation, |state| {
                state.path_exists = exists
            })
            .await;
        result
    }

    pub async fn notify(
        &self,
        category: NotificationCategory,
        title: Option<&str>,
        body: Option<&str>,
    ) -> DispatchOutcome {
        let generation = self.store.begin(ActionKind::Notification).await;
        let body = body
            .map(str::trim)
            .filter(|body| !body.is_empty())
            .unwrap_or(DEFAULT_NOTIFICATION_BODY);
        let notification = shared::domain::Notification::new(category, title, body);
        let outcome = self.engine.notify(notification).await;
        let permission = self.gate.state().await;
        let recorded = outcome.clone();
        self.store
            .apply(ActionKind::Notification, generation, |state| {
                state.permission = permission;
                state.last_notification = Some(recorded);
            })
            .await;
        outcome
    }

    pub async fn permission(&self) -> PermissionState {
        self.gate.state().await
    }

    pub async fn message_demo(&self, kind: MessageKind) {
        let (title, text) = match kind {
            MessageKind::Info => (
                "Info",
                "ℹ️ Info dialog\n\nUsed to show general information.\n\nKind: info",
            ),
            MessageKind::Warning => (
                "Warning",
                "⚠️ Warning dialog\n\nUsed to show a warning.\n\nKind: warning",
            ),
            MessageKind::Error => (
                "Error",
                "❌ Error dialog\n\nUsed to show an error.\n\nKind: error",
            ),
        };
        self.engine.inform(kind, title, text).await;
    }

    pub async fn confirm_demo(&self) -> WorkflowReport {
        self.run_demo(WorkflowKind::ConfirmDemo, workflow::confirm_demo())
            .await
    }

    pub async fn chained_demo(&self) -> WorkflowReport {
        self.run_demo(
            WorkflowKind::ChainedDemo,
            workflow::chained_demo(self.chain_delay),
        )
        .await
    }

    pub async fn set_window_title(&self, title: &str) -> Result<(), String> {
        let generation = self.store.begin(ActionKind::Window).await;
        self.window.set_title(title).await?;
        let title = title.to_string();
        self.store
            .apply(ActionKind::Window, generation, |state| {
                state.window_title = title
            })
            .await;
        Ok(())
    }

    pub async fn set_window_size(&self, size: &str) -> Result<WindowSize, String> {
        let generation = self.store.begin(ActionKind::Window).await;
        let size = self.window.set_size(size).await?;
        self.store
            .apply(ActionKind::Window, generation, |state| {
                state.window_size = Some(size)
            })
            .await;
        Ok(size)
    }

    pub async fn center_window(&self) -> Result<(), String> {
        self.window.center().await
    }

    pub async fn toggle_secondary(&self) -> Result<bool, String> {
        let generation = self.store.begin(ActionKind::Window).await;
        let visible = self.window.toggle_secondary().await?;
        self.store
            .apply(ActionKind::Window, generation, |state| {
                state.secondary_visible = visible
            })
            .await;
        Ok(visible)
    }

    async fn run_demo(&self, kind: WorkflowKind, workflow: workflow::Workflow<'static>) -> WorkflowReport {
        let generation = self.store.begin(ActionKind::Workflow(kind)).await;
        let report = self.engine.run(workflow).await;
        let outcome = (report.kind, report.state.clone());
        self.store
            .apply(ActionKind::Workflow(kind), generation, |state| {
                state.last_workflow = Some(outcome)
            })
            .await;
        report
    }

    async fn sync_file(&self, generation: u64, report: Option<&WorkflowReport>) {
        let handle = self.files.current().await;
        let outcome = report.map(|report| (report.kind, report.state.clone()));
        let permission = self.gate.state().await;
        self.store
            .apply(ActionKind::File, generation, |state| {
                state.file_path = handle.as_ref().and_then(|handle| handle.path.clone());
                state.file_dirty = handle.as_ref().is_some_and(|handle| handle.dirty);
                state.permission = permission;
                if outcome.is_some() {
                    state.last_workflow = outcome;
                }
            })
            .await;
    }
}

fn render(result: &Result<Calculation, GatewayError>) -> Result<String, String> {
    match result {
        Ok(calculation) => Ok(calculation.to_string()),
        Err(err) => Err(err.reason()),
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
