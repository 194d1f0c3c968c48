//! File actions on the single open buffer.
//!
//! Every action that reads or mutates the buffer holds the buffer slot for
//! its whole duration, so a save can never interleave with a delete.

use std::{path::Path, sync::Arc};

use shared::domain::{DirectoryListing, FileHandle, MessageKind};
use tokio::sync::Mutex;

use crate::{
    error::error_message,
    providers::{Dialogs, FileFilter, FileSystem},
    workflow::{
        self, WorkflowEngine, WorkflowKind, WorkflowReport, WorkflowState, ERROR_TITLE,
        NOTICE_TITLE,
    },
};

pub const SELECT_FILE_FIRST: &str = "Please select a file first";
pub const ENTER_PATH_FIRST: &str = "Please enter a file path";

fn open_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::new("Text files", &["txt", "md"]),
        FileFilter::new("All files", &["*"]),
    ]
}

fn save_filters() -> Vec<FileFilter> {
    vec![FileFilter::new("Text files", &["txt"])]
}

#[derive(Clone)]
pub struct FileWorkflows {
    fs: Arc<dyn FileSystem>,
    dialogs: Arc<dyn Dialogs>,
    engine: WorkflowEngine,
    slot: Arc<Mutex<Option<FileHandle>>>,
    default_save_name: String,
}

impl FileWorkflows {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        dialogs: Arc<dyn Dialogs>,
        engine: WorkflowEngine,
        default_save_name: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            dialogs,
            engine,
            slot: Arc::new(Mutex::new(None)),
            default_save_name: default_save_name.into(),
        }
    }

    pub async fn current(&self) -> Option<FileHandle> {
        self.slot.lock().await.clone()
    }

    /// Picks a file and makes it the open buffer. `Ok(None)` when the picker
    /// was cancelled.
    pub async fn open(&self) -> Result<Option<FileHandle>, String> {
        let mut slot = self.slot.lock().await;

        let result = async {
            let Some(path) = self.dialogs.pick_file(&open_filters()).await? else {
                return Ok(None);
            };
            let content = self.fs.read_text(&path).await?;
            Ok::<_, anyhow::Error>(Some(FileHandle::opened(path, content)))
        }
        .await;

        match result {
            Ok(Some(handle)) => {
                tracing::info!(path = ?handle.path, "file opened");
                *slot = Some(handle.clone());
                Ok(Some(handle))
            }
            Ok(None) => {
                tracing::debug!("file selection cancelled");
                Ok(None)
            }
            Err(err) => {
                let reason = error_message(&err);
                self.engine
                    .inform(
                        MessageKind::Error,
                        ERROR_TITLE,
                        &format!("Failed to open file: {reason}"),
                    )
                    .await;
                Err(reason)
            }
        }
    }

    pub async fn edit(&self, content: impl Into<String>) {
        let content = content.into();
        let mut slot = self.slot.lock().await;
        match slot.as_mut() {
            Some(handle) => {
                handle.content = content;
                handle.dirty = true;
            }
            None => *slot = Some(FileHandle::unsaved(content)),
        }
    }

    pub async fn close(&self) -> Option<FileHandle> {
        self.slot.lock().await.take()
    }

    pub async fn save(&self) -> WorkflowReport {
        let mut slot = self.slot.lock().await;
        let handle = slot.get_or_insert_with(FileHandle::default);

        match handle.path.clone() {
            Some(path) => {
                self.engine
                    .run(workflow::save_file(self.fs.as_ref(), handle, path))
                    .await
            }
            None => self.pick_and_save(handle).await,
        }
    }

    pub async fn save_as(&self) -> WorkflowReport {
        let mut slot = self.slot.lock().await;
        let handle = slot.get_or_insert_with(FileHandle::default);
        self.pick_and_save(handle).await
    }

    async fn pick_and_save(&self, handle: &mut FileHandle) -> WorkflowReport {
        match self
            .dialogs
            .pick_save_path(&self.default_save_name, &save_filters())
            .await
        {
            Ok(Some(path)) => {
                self.engine
                    .run(workflow::save_file(self.fs.as_ref(), handle, path))
                    .await
            }
            Ok(None) => {
                tracing::debug!("save destination selection cancelled");
                WorkflowReport::short_circuit(WorkflowKind::SaveFile, WorkflowState::Cancelled)
            }
            Err(err) => {
                let reason = error_message(&err);
                self.engine
                    .inform(
                        MessageKind::Error,
                        ERROR_TITLE,
                        &format!("Save as failed: {reason}"),
                    )
                    .await;
                WorkflowReport::short_circuit(WorkflowKind::SaveFile, WorkflowState::Failed(reason))
            }
        }
    }

    /// Runs the delete workflow on the open file. Without a saved file the
    /// user is told to select one and nothing else happens.
    pub async fn delete(&self) -> WorkflowReport {
        let mut slot = self.slot.lock().await;
        let Some(path) = slot.as_ref().and_then(|handle| handle.path.clone()) else {
            self.engine
                .inform(MessageKind::Warning, NOTICE_TITLE, SELECT_FILE_FIRST)
                .await;
            return WorkflowReport::short_circuit(
                WorkflowKind::DeleteFile,
                WorkflowState::Cancelled,
            );
        };

        self.engine
            .run(workflow::delete_file(self.fs.as_ref(), &mut *slot, &path))
            .await
    }

    pub async fn select_directory(&self) -> Result<Option<DirectoryListing>, String> {
        let result = async {
            let Some(root) = self.dialogs.pick_directory().await? else {
                return Ok(None);
            };
            let entries = self.fs.read_dir(&root).await?;
            Ok::<_, anyhow::Error>(Some(DirectoryListing { root, entries }))
        }
        .await;

        match result {
            Ok(listing) => Ok(listing),
            Err(err) => {
                let reason = error_message(&err);
                self.engine
                    .inform(
                        MessageKind::Error,
                        ERROR_TITLE,
                        &format!("Failed to select directory: {reason}"),
                    )
                    .await;
                Err(reason)
            }
        }
    }

    /// `Ok(None)` when no path was entered; the provider is not called then.
    pub async fn check_exists(&self, input: &str) -> Result<Option<bool>, String> {
        let input = input.trim();
        if input.is_empty() {
            self.engine
                .inform(MessageKind::Warning, NOTICE_TITLE, ENTER_PATH_FIRST)
                .await;
            return Ok(None);
        }

        match self.fs.exists(Path::new(input)).await {
            Ok(exists) => {
                tracing::debug!(path = %input, exists, "checked path");
                Ok(Some(exists))
            }
            Err(err) => {
                let reason = error_message(&err);
                self.engine
                    .inform(
                        MessageKind::Error,
                        ERROR_TITLE,
                        &format!("Failed to check file: {reason}"),
                    )
                    .await;
                Err(reason)
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn replace(&self, handle: Option<FileHandle>) {
        *self.slot.lock().await = handle;
    }
}

#[cfg(test)]
#[path = "tests/files_tests.rs"]
mod tests;
