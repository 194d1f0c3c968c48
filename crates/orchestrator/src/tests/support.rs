//! Recording fakes for the provider traits.
//!
//! Every fake writes into a shared [`Effects`] log so tests can assert the
//! exact order in which dialogs, notifications and file operations happened.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::{Command, DirEntry, MessageKind, Notification, PermissionState, WindowSize},
    error::{BackendError, ErrorCode},
    protocol::{BackendEvent, MenuAction, WindowEvent},
};
use tokio::sync::broadcast;

use crate::{
    files::FileWorkflows,
    notify::NotificationDispatcher,
    permission::PermissionGate,
    providers::{
        Backend, Dialogs, EventSource, FileFilter, FileSystem, NotificationPlatform, WindowControl,
    },
    session::{Providers, Session, SessionSettings},
    window::WindowController,
    workflow::WorkflowEngine,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Invoked(String),
    Ask(String, String),
    Message(MessageKind, String, String),
    PickFile,
    PickSavePath(String),
    PickDirectory,
    PermissionQueried,
    PermissionRequested,
    Notified(Notification),
    Read(PathBuf),
    Wrote(PathBuf, String),
    Listed(PathBuf),
    Checked(PathBuf),
    Removed(PathBuf),
}

#[derive(Clone, Default)]
pub struct Effects(Arc<Mutex<Vec<Effect>>>);

impl Effects {
    pub fn record(&self, effect: Effect) {
        self.0.lock().expect("effects lock").push(effect);
    }

    pub fn all(&self) -> Vec<Effect> {
        self.0.lock().expect("effects lock").clone()
    }

    pub fn messages(&self) -> Vec<(MessageKind, String, String)> {
        self.all()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Message(kind, title, text) => Some((kind, title, text)),
                _ => None,
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct FakeBackend {
    effects: Effects,
    commands: Arc<Mutex<Vec<Command>>>,
    failure: Option<String>,
}

impl FakeBackend {
    pub fn new(effects: Effects) -> Self {
        Self {
            effects,
            commands: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    pub fn failing(effects: Effects, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(effects)
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().expect("commands lock").clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn invoke(&self, command: Command) -> std::result::Result<Value, BackendError> {
        self.effects.record(Effect::Invoked(command.name.clone()));
        self.commands
            .lock()
            .expect("commands lock")
            .push(command.clone());
        match &self.failure {
            Some(message) => Err(BackendError::new(ErrorCode::Internal, message.clone())),
            None => backend::dispatch(&command),
        }
    }
}

#[derive(Default)]
struct DialogScript {
    answers: VecDeque<bool>,
    file: Option<PathBuf>,
    save_path: Option<PathBuf>,
    directory: Option<PathBuf>,
    broken_ask: bool,
    broken_pickers: bool,
}

/// Confirmations answer yes unless an answer was queued; pickers return
/// whatever path was configured, `None` meaning cancelled.
#[derive(Clone)]
pub struct FakeDialogs {
    effects: Effects,
    script: Arc<Mutex<DialogScript>>,
}

impl FakeDialogs {
    pub fn new(effects: Effects) -> Self {
        Self {
            effects,
            script: Arc::default(),
        }
    }

    pub fn answer(&self, yes: bool) {
        self.script().answers.push_back(yes);
    }

    pub fn choose_file(&self, path: impl Into<PathBuf>) {
        self.script().file = Some(path.into());
    }

    pub fn choose_save_path(&self, path: impl Into<PathBuf>) {
        self.script().save_path = Some(path.into());
    }

    pub fn choose_directory(&self, path: impl Into<PathBuf>) {
        self.script().directory = Some(path.into());
    }

    pub fn break_ask(&self) {
        self.script().broken_ask = true;
    }

    pub fn break_pickers(&self) {
        self.script().broken_pickers = true;
    }

    fn script(&self) -> std::sync::MutexGuard<'_, DialogScript> {
        self.script.lock().expect("dialog script lock")
    }
}

#[async_trait]
impl Dialogs for FakeDialogs {
    async fn pick_file(&self, _filters: &[FileFilter]) -> Result<Option<PathBuf>> {
        self.effects.record(Effect::PickFile);
        let script = self.script();
        if script.broken_pickers {
            bail!("dialog backend unavailable");
        }
        Ok(script.file.clone())
    }

    async fn pick_save_path(
        &self,
        default_name: &str,
        _filters: &[FileFilter],
    ) -> Result<Option<PathBuf>> {
        self.effects
            .record(Effect::PickSavePath(default_name.to_string()));
        let script = self.script();
        if script.broken_pickers {
            bail!("dialog backend unavailable");
        }
        Ok(script.save_path.clone())
    }

    async fn pick_directory(&self) -> Result<Option<PathBuf>> {
        self.effects.record(Effect::PickDirectory);
        let script = self.script();
        if script.broken_pickers {
            bail!("dialog backend unavailable");
        }
        Ok(script.directory.clone())
    }

    async fn message(&self, kind: MessageKind, title: &str, text: &str) -> Result<()> {
        self.effects
            .record(Effect::Message(kind, title.to_string(), text.to_string()));
        Ok(())
    }

    async fn ask(&self, title: &str, text: &str) -> Result<bool> {
        self.effects
            .record(Effect::Ask(title.to_string(), text.to_string()));
        let mut script = self.script();
        if script.broken_ask {
            bail!("confirmation dialog unavailable");
        }
        Ok(script.answers.pop_front().unwrap_or(true))
    }
}

struct NotificationState {
    granted: bool,
    answer: PermissionState,
    broken: bool,
    send_failure: Option<String>,
    queries: usize,
    requests: usize,
    sent: Vec<Notification>,
}

#[derive(Clone)]
pub struct FakeNotifications {
    effects: Effects,
    state: Arc<Mutex<NotificationState>>,
}

impl FakeNotifications {
    fn with_state(effects: Effects, granted: bool, answer: PermissionState, broken: bool) -> Self {
        Self {
            effects,
            state: Arc::new(Mutex::new(NotificationState {
                granted,
                answer,
                broken,
                send_failure: None,
                queries: 0,
                requests: 0,
                sent: Vec::new(),
            })),
        }
    }

    pub fn granted(effects: Effects) -> Self {
        Self::with_state(effects, true, PermissionState::Granted, false)
    }

    /// Not granted yet; a request resolves to `answer`.
    pub fn prompting(effects: Effects, answer: PermissionState) -> Self {
        Self::with_state(effects, false, answer, false)
    }

    pub fn broken(effects: Effects) -> Self {
        Self::with_state(effects, false, PermissionState::Denied, true)
    }

    pub fn with_send_failure(self, reason: &str) -> Self {
        self.state().send_failure = Some(reason.to_string());
        self
    }

    /// Withdraws the permission; later requests are denied too.
    pub fn revoke(&self) {
        let mut state = self.state();
        state.granted = false;
        state.answer = PermissionState::Denied;
    }

    pub fn requests(&self) -> usize {
        self.state().requests
    }

    pub fn queries(&self) -> usize {
        self.state().queries
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.state().sent.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, NotificationState> {
        self.state.lock().expect("notification state lock")
    }
}

#[async_trait]
impl NotificationPlatform for FakeNotifications {
    async fn is_permission_granted(&self) -> Result<bool> {
        self.effects.record(Effect::PermissionQueried);
        let mut state = self.state();
        state.queries += 1;
        if state.broken {
            bail!("notification service unavailable");
        }
        Ok(state.granted)
    }

    async fn request_permission(&self) -> Result<PermissionState> {
        self.effects.record(Effect::PermissionRequested);
        let mut state = self.state();
        state.requests += 1;
        if state.broken {
            bail!("notification service unavailable");
        }
        state.granted = state.answer == PermissionState::Granted;
        Ok(state.answer)
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        self.effects.record(Effect::Notified(notification.clone()));
        let mut state = self.state();
        if let Some(reason) = &state.send_failure {
            return Err(anyhow!(reason.clone()));
        }
        state.sent.push(notification.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Disk {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeMap<PathBuf, Vec<DirEntry>>,
    write_failure: Option<String>,
    remove_failure: Option<String>,
}

#[derive(Clone)]
pub struct MemoryFileSystem {
    effects: Effects,
    disk: Arc<Mutex<Disk>>,
}

impl MemoryFileSystem {
    pub fn new(effects: Effects) -> Self {
        Self {
            effects,
            disk: Arc::default(),
        }
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: &str) {
        self.disk().files.insert(path.into(), content.to_string());
    }

    pub fn insert_dir(&self, path: impl Into<PathBuf>, entries: &[(&str, bool)]) {
        let entries = entries
            .iter()
            .map(|(name, is_directory)| DirEntry {
                name: name.to_string(),
                is_directory: *is_directory,
            })
            .collect();
        self.disk().dirs.insert(path.into(), entries);
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.disk().files.get(path.as_ref()).cloned()
    }

    pub fn fail_writes(&self, reason: &str) {
        self.disk().write_failure = Some(reason.to_string());
    }

    pub fn fail_removes(&self, reason: &str) {
        self.disk().remove_failure = Some(reason.to_string());
    }

    fn disk(&self) -> std::sync::MutexGuard<'_, Disk> {
        self.disk.lock().expect("disk lock")
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read_text(&self, path: &Path) -> Result<String> {
        self.effects.record(Effect::Read(path.to_path_buf()));
        self.disk()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no such file: {}", path.display()))
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        self.effects
            .record(Effect::Wrote(path.to_path_buf(), content.to_string()));
        let mut disk = self.disk();
        if let Some(reason) = &disk.write_failure {
            return Err(anyhow!(reason.clone()));
        }
        disk.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.effects.record(Effect::Listed(path.to_path_buf()));
        self.disk()
            .dirs
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no such directory: {}", path.display()))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.effects.record(Effect::Checked(path.to_path_buf()));
        let disk = self.disk();
        Ok(disk.files.contains_key(path) || disk.dirs.contains_key(path))
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        self.effects.record(Effect::Removed(path.to_path_buf()));
        let mut disk = self.disk();
        if let Some(reason) = &disk.remove_failure {
            return Err(anyhow!(reason.clone()));
        }
        disk.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| anyhow!("no such file: {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub title: String,
    pub size: WindowSize,
    pub centered: bool,
    pub visible: HashMap<String, bool>,
}

#[derive(Clone)]
pub struct FakeWindow {
    state: Arc<Mutex<WindowSnapshot>>,
}

impl FakeWindow {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowSnapshot {
                title: "Main Window".to_string(),
                size: WindowSize::new(1200, 800),
                centered: false,
                visible: HashMap::new(),
            })),
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.state.lock().expect("window lock").clone()
    }
}

#[async_trait]
impl WindowControl for FakeWindow {
    async fn set_title(&self, title: &str) -> Result<()> {
        self.state.lock().expect("window lock").title = title.to_string();
        Ok(())
    }

    async fn set_size(&self, size: WindowSize) -> Result<()> {
        self.state.lock().expect("window lock").size = size;
        Ok(())
    }

    async fn center(&self) -> Result<()> {
        self.state.lock().expect("window lock").centered = true;
        Ok(())
    }

    async fn is_visible(&self, label: &str) -> Result<bool> {
        let state = self.state.lock().expect("window lock");
        Ok(state.visible.get(label).copied().unwrap_or(false))
    }

    async fn set_visible(&self, label: &str, visible: bool) -> Result<()> {
        self.state
            .lock()
            .expect("window lock")
            .visible
            .insert(label.to_string(), visible);
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeEvents {
    backend: broadcast::Sender<BackendEvent>,
    window: broadcast::Sender<WindowEvent>,
    unavailable: bool,
}

impl FakeEvents {
    pub fn new() -> Self {
        let (backend, _) = broadcast::channel(16);
        let (window, _) = broadcast::channel(16);
        Self {
            backend,
            window,
            unavailable: false,
        }
    }

    /// Every subscription attempt fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    pub fn emit(&self, event: BackendEvent) {
        let _ = self.backend.send(event);
    }

    pub fn emit_menu(&self, id: &str) {
        self.emit(BackendEvent::menu_action(MenuAction::from_id(id)));
    }

    pub fn emit_window(&self, event: WindowEvent) {
        let _ = self.window.send(event);
    }

    pub fn subscribers(&self) -> usize {
        self.backend.receiver_count() + self.window.receiver_count()
    }
}

impl EventSource for FakeEvents {
    fn listen(&self, event: &str) -> Result<broadcast::Receiver<BackendEvent>> {
        if self.unavailable {
            bail!("event channel unavailable for `{event}`");
        }
        Ok(self.backend.subscribe())
    }

    fn window_events(&self) -> Result<broadcast::Receiver<WindowEvent>> {
        if self.unavailable {
            bail!("window events unavailable");
        }
        Ok(self.window.subscribe())
    }
}

/// One of each fake, all recording into the same log.
pub struct Harness {
    pub effects: Effects,
    pub backend: FakeBackend,
    pub dialogs: FakeDialogs,
    pub notifications: FakeNotifications,
    pub fs: MemoryFileSystem,
    pub window: FakeWindow,
    pub events: FakeEvents,
}

impl Harness {
    pub fn new() -> Self {
        let effects = Effects::default();
        Self::with_notifications(FakeNotifications::granted(effects.clone()), effects)
    }

    pub fn with_notifications(notifications: FakeNotifications, effects: Effects) -> Self {
        Self {
            backend: FakeBackend::new(effects.clone()),
            dialogs: FakeDialogs::new(effects.clone()),
            fs: MemoryFileSystem::new(effects.clone()),
            window: FakeWindow::new(),
            events: FakeEvents::new(),
            notifications,
            effects,
        }
    }

    pub fn denying_notifications() -> Self {
        let effects = Effects::default();
        let notifications = FakeNotifications::prompting(effects.clone(), PermissionState::Denied);
        Self::with_notifications(notifications, effects)
    }

    pub fn engine(&self) -> WorkflowEngine {
        let platform: Arc<dyn NotificationPlatform> = Arc::new(self.notifications.clone());
        let gate = Arc::new(PermissionGate::new(platform.clone()));
        let notifier = Arc::new(NotificationDispatcher::new(gate, platform));
        WorkflowEngine::new(Arc::new(self.dialogs.clone()), notifier)
    }

    pub fn files(&self) -> FileWorkflows {
        FileWorkflows::new(
            Arc::new(self.fs.clone()),
            Arc::new(self.dialogs.clone()),
            self.engine(),
            "untitled.txt",
        )
    }

    pub fn window_controller(&self) -> WindowController {
        WindowController::new(Arc::new(self.window.clone()), self.engine())
    }

    pub fn providers(&self) -> Providers {
        Providers {
            backend: Arc::new(self.backend.clone()),
            fs: Arc::new(self.fs.clone()),
            dialogs: Arc::new(self.dialogs.clone()),
            notifications: Arc::new(self.notifications.clone()),
            window: Arc::new(self.window.clone()),
            events: Arc::new(self.events.clone()),
        }
    }

    pub fn session(&self) -> Session {
        Session::start(
            self.providers(),
            SessionSettings {
                chain_delay: Duration::from_millis(10),
                ..SessionSettings::default()
            },
        )
    }
}
