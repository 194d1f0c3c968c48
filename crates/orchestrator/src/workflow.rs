//! Sequential confirmation workflows.
//!
//! A [`Workflow`] is an ordered list of [`Step`]s run one at a time by the
//! [`WorkflowEngine`]. The run stops at the first declined confirmation
//! (`Cancelled`) or the first failing computation (`Failed`); otherwise it
//! ends `Completed`. Compute steps are futures that may borrow state owned
//! by the caller, e.g. the open file buffer, for the duration of the run.

use std::{future::Future, path::Path, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use shared::domain::{FileHandle, MessageKind, Notification};
use uuid::Uuid;

use crate::{
    error::error_message,
    notify::{DispatchOutcome, NotificationDispatcher},
    providers::{Dialogs, FileSystem},
};

pub const NOTICE_TITLE: &str = "Notice";
pub const ERROR_TITLE: &str = "Error";
pub const PERMISSION_NOT_GRANTED: &str =
    "Notification permission not granted; the notification was not shown.";

pub type ComputeFuture<'a> = BoxFuture<'a, Result<(), String>>;

pub enum Step<'a> {
    Compute { label: String, task: ComputeFuture<'a> },
    Confirm { title: String, prompt: String },
    Inform { title: String, message: String, kind: MessageKind },
    Notify(Notification),
}

impl<'a> Step<'a> {
    pub fn compute<F>(label: impl Into<String>, task: F) -> Self
    where
        F: Future<Output = Result<(), String>> + Send + 'a,
    {
        Step::Compute {
            label: label.into(),
            task: Box::pin(task),
        }
    }

    pub fn confirm(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Step::Confirm {
            title: title.into(),
            prompt: prompt.into(),
        }
    }

    pub fn inform(kind: MessageKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Step::Inform {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Step::Compute { .. } => "compute",
            Step::Confirm { .. } => "confirm",
            Step::Inform { .. } => "inform",
            Step::Notify(_) => "notify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    DeleteFile,
    SaveFile,
    ChainedDemo,
    ConfirmDemo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Running(usize),
    Completed,
    Cancelled,
    Failed(String),
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Completed | WorkflowState::Cancelled | WorkflowState::Failed(_)
        )
    }
}

pub struct Workflow<'a> {
    kind: WorkflowKind,
    steps: Vec<Step<'a>>,
    cancel_message: String,
    failure_context: String,
}

impl<'a> Workflow<'a> {
    pub fn new(kind: WorkflowKind) -> Self {
        Self {
            kind,
            steps: Vec::new(),
            cancel_message: "Operation cancelled".to_string(),
            failure_context: "Operation failed".to_string(),
        }
    }

    pub fn step(mut self, step: Step<'a>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn on_cancel(mut self, message: impl Into<String>) -> Self {
        self.cancel_message = message.into();
        self
    }

    pub fn on_failure(mut self, context: impl Into<String>) -> Self {
        self.failure_context = context.into();
        self
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub id: Uuid,
    pub kind: WorkflowKind,
    pub state: WorkflowState,
    pub notifications: Vec<DispatchOutcome>,
}

impl WorkflowReport {
    pub fn short_circuit(kind: WorkflowKind, state: WorkflowState) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            state,
            notifications: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct WorkflowEngine {
    dialogs: Arc<dyn Dialogs>,
    notifier: Arc<NotificationDispatcher>,
}

impl WorkflowEngine {
    pub fn new(dialogs: Arc<dyn Dialogs>, notifier: Arc<NotificationDispatcher>) -> Self {
        Self { dialogs, notifier }
    }

    pub async fn run(&self, workflow: Workflow<'_>) -> WorkflowReport {
        let Workflow {
            kind,
            steps,
            cancel_message,
            failure_context,
        } = workflow;
        let id = Uuid::new_v4();
        let total = steps.len();
        let mut notifications = Vec::new();
        let mut state = WorkflowState::Idle;
        tracing::info!(workflow = ?kind, %id, steps = total, "workflow started");

        for (index, step) in steps.into_iter().enumerate() {
            state = WorkflowState::Running(index);
            tracing::debug!(workflow = ?kind, %id, step = index, kind = step.name(), "running step");

            match step {
                Step::Confirm { title, prompt } => match self.dialogs.ask(&title, &prompt).await {
                    Ok(true) => {}
                    Ok(false) => {
                        self.inform(MessageKind::Info, NOTICE_TITLE, &cancel_message)
                            .await;
                        state = WorkflowState::Cancelled;
                        break;
                    }
                    Err(err) => {
                        let reason = error_message(&err);
                        self.fail(&failure_context, &reason).await;
                        state = WorkflowState::Failed(reason);
                        break;
                    }
                },
                Step::Compute { label, task } => {
                    if let Err(reason) = task.await {
                        tracing::warn!(workflow = ?kind, %id, step = %label, %reason, "compute step failed");
                        self.fail(&failure_context, &reason).await;
                        state = WorkflowState::Failed(reason);
                        break;
                    }
                }
                Step::Inform {
                    title,
                    message,
                    kind: severity,
                } => self.inform(severity, &title, &message).await,
                Step::Notify(notification) => {
                    let outcome = self.notifier.dispatch(notification).await;
                    self.acknowledge(&outcome).await;
                    notifications.push(outcome);
                }
            }
        }

        if !state.is_terminal() {
            state = WorkflowState::Completed;
        }
        tracing::info!(workflow = ?kind, %id, state = ?state, "workflow finished");

        WorkflowReport {
            id,
            kind,
            state,
            notifications,
        }
    }

    /// Shows a message dialog. A dialog that cannot be shown is logged; it
    /// never changes the outcome of the action that asked for it.
    pub async fn inform(&self, kind: MessageKind, title: &str, message: &str) {
        if let Err(err) = self.dialogs.message(kind, title, message).await {
            tracing::error!(%title, error = %error_message(&err), "failed to show message dialog");
        }
    }

    pub async fn notify(&self, notification: Notification) -> DispatchOutcome {
        let outcome = self.notifier.dispatch(notification).await;
        self.acknowledge(&outcome).await;
        outcome
    }

    async fn acknowledge(&self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Delivered => {}
            DispatchOutcome::Suppressed => {
                self.inform(MessageKind::Warning, NOTICE_TITLE, PERMISSION_NOT_GRANTED)
                    .await
            }
            DispatchOutcome::Failed(reason) => {
                self.inform(
                    MessageKind::Warning,
                    NOTICE_TITLE,
                    &format!("Failed to send notification: {reason}"),
                )
                .await
            }
        }
    }

    /// Best-effort error notification, then the error dialog carrying the
    /// original reason.
    async fn fail(&self, context: &str, reason: &str) {
        let message = format!("{context}: {reason}");
        let outcome = self
            .notifier
            .dispatch(Notification::error(message.clone()))
            .await;
        if !outcome.is_delivered() {
            tracing::debug!(?outcome, "error notification not delivered");
        }
        self.inform(MessageKind::Error, ERROR_TITLE, &message).await;
    }
}

/// Confirm, remove the file, report. `slot` is emptied once removal succeeds.
pub fn delete_file<'a>(
    fs: &'a dyn FileSystem,
    slot: &'a mut Option<FileHandle>,
    path: &'a Path,
) -> Workflow<'a> {
    let shown = path.display().to_string();
    Workflow::new(WorkflowKind::DeleteFile)
        .on_cancel("Deletion cancelled")
        .on_failure("File deletion failed")
        .step(Step::confirm(
            "Confirm file deletion",
            format!("Delete this file?\n\nPath: {shown}"),
        ))
        .step(Step::compute("delete", async move {
            fs.remove(path).await.map_err(|err| error_message(&err))?;
            *slot = None;
            Ok::<(), String>(())
        }))
        .step(Step::Notify(Notification::success(format!(
            "File deleted: {shown}"
        ))))
        .step(Step::inform(
            MessageKind::Info,
            NOTICE_TITLE,
            "File deleted successfully",
        ))
}

pub fn save_file<'a>(
    fs: &'a dyn FileSystem,
    handle: &'a mut FileHandle,
    path: std::path::PathBuf,
) -> Workflow<'a> {
    let shown = path.display().to_string();
    Workflow::new(WorkflowKind::SaveFile)
        .on_failure("File save failed")
        .step(Step::compute("write", async move {
            fs.write_text(&path, &handle.content)
                .await
                .map_err(|err| error_message(&err))?;
            handle.path = Some(path);
            handle.dirty = false;
            Ok::<(), String>(())
        }))
        .step(Step::Notify(Notification::success(format!(
            "File saved: {shown}"
        ))))
        .step(Step::inform(
            MessageKind::Info,
            NOTICE_TITLE,
            "File saved successfully!",
        ))
}

pub const CHAIN_COMPLETE_MESSAGE: &str = "✅ Chained operation complete\n\n\
All steps ran successfully:\n1. Confirm\n2. Info\n3. Notification\n4. Completion";

pub fn chained_demo(delay: Duration) -> Workflow<'static> {
    Workflow::new(WorkflowKind::ChainedDemo)
        .on_cancel("Chained operation cancelled")
        .on_failure("Chained operation failed")
        .step(Step::confirm(
            "Step 1: Confirm",
            "Continue with the chained operation?",
        ))
        .step(Step::inform(
            MessageKind::Info,
            "Step 2: Info",
            "Operation in progress, please wait...",
        ))
        .step(Step::compute("delay", async move {
            tokio::time::sleep(delay).await;
            Ok(())
        }))
        .step(Step::Notify(Notification::success(
            "All chained steps completed!",
        )))
        .step(Step::inform(
            MessageKind::Info,
            "Step 3: Done",
            CHAIN_COMPLETE_MESSAGE,
        ))
}

pub fn confirm_demo() -> Workflow<'static> {
    Workflow::new(WorkflowKind::ConfirmDemo)
        .on_cancel("Operation cancelled")
        .step(Step::confirm("Confirm", "Proceed with this operation?"))
        .step(Step::inform(MessageKind::Info, NOTICE_TITLE, "Operation confirmed"))
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
