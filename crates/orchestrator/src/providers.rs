//! Capability providers the orchestrator drives. Implementations live
//! outside this crate; every call returns an explicit result.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::{Command, DirEntry, MessageKind, Notification, PermissionState, WindowSize},
    error::BackendError,
    protocol::{BackendEvent, WindowEvent},
};
use tokio::sync::broadcast;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn invoke(&self, command: Command) -> std::result::Result<Value, BackendError>;
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_text(&self, path: &Path) -> Result<String>;
    async fn write_text(&self, path: &Path, content: &str) -> Result<()>;
    async fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;
    async fn exists(&self, path: &Path) -> Result<bool>;
    async fn remove(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Native dialogs. Pickers resolve to `Ok(None)` when the user cancels;
/// that is a normal outcome, not an error.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn pick_file(&self, filters: &[FileFilter]) -> Result<Option<PathBuf>>;
    async fn pick_save_path(
        &self,
        default_name: &str,
        filters: &[FileFilter],
    ) -> Result<Option<PathBuf>>;
    async fn pick_directory(&self) -> Result<Option<PathBuf>>;
    async fn message(&self, kind: MessageKind, title: &str, text: &str) -> Result<()>;
    async fn ask(&self, title: &str, text: &str) -> Result<bool>;
}

#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    async fn is_permission_granted(&self) -> Result<bool>;
    async fn request_permission(&self) -> Result<PermissionState>;
    async fn send(&self, notification: &Notification) -> Result<()>;
}

#[async_trait]
pub trait WindowControl: Send + Sync {
    async fn set_title(&self, title: &str) -> Result<()>;
    async fn set_size(&self, size: WindowSize) -> Result<()>;
    async fn center(&self) -> Result<()>;
    async fn is_visible(&self, label: &str) -> Result<bool>;
    async fn set_visible(&self, label: &str, visible: bool) -> Result<()>;
}

/// Subscription channel for events originating outside the front-end.
/// A `listen` receiver may also carry other event names; callers filter.
pub trait EventSource: Send + Sync {
    fn listen(&self, event: &str) -> Result<broadcast::Receiver<BackendEvent>>;
    fn window_events(&self) -> Result<broadcast::Receiver<WindowEvent>>;
}
