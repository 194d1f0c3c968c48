use std::{str::FromStr, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use orchestrator::providers::NotificationPlatform;
use shared::domain::{Notification, PermissionState};
use tokio::sync::Mutex;

use crate::error::ProviderError;

/// How the console platform answers permission requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    Granted,
    Denied,
    /// Ask through the configured prompt on the first request.
    Prompt,
}

impl FromStr for PermissionMode {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(PermissionMode::Granted),
            "denied" => Ok(PermissionMode::Denied),
            "prompt" => Ok(PermissionMode::Prompt),
            other => Err(ProviderError::InvalidPermissionMode(other.to_string())),
        }
    }
}

/// Blocking question shown when permission is first requested.
pub type PermissionPrompt = Arc<dyn Fn() -> Result<bool> + Send + Sync>;

/// Prints notifications to stdout.
pub struct ConsoleNotifier {
    mode: PermissionMode,
    prompt: Option<PermissionPrompt>,
    state: Mutex<PermissionState>,
    delivered: Mutex<Vec<Notification>>,
}

impl ConsoleNotifier {
    pub fn new(mode: PermissionMode) -> Self {
        let state = match mode {
            PermissionMode::Granted => PermissionState::Granted,
            PermissionMode::Denied | PermissionMode::Prompt => PermissionState::Unknown,
        };
        Self {
            mode,
            prompt: None,
            state: Mutex::new(state),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn with_prompt(mut self, prompt: PermissionPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    async fn ask(&self) -> Result<PermissionState> {
        let Some(prompt) = self.prompt.clone() else {
            tracing::debug!("no permission prompt configured; denying");
            return Ok(PermissionState::Denied);
        };
        let granted = tokio::task::spawn_blocking(move || prompt()).await??;
        Ok(if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        })
    }
}

#[async_trait]
impl NotificationPlatform for ConsoleNotifier {
    async fn is_permission_granted(&self) -> Result<bool> {
        Ok(*self.state.lock().await == PermissionState::Granted)
    }

    async fn request_permission(&self) -> Result<PermissionState> {
        let mut state = self.state.lock().await;
        if *state != PermissionState::Unknown {
            return Ok(*state);
        }

        let answer = match self.mode {
            PermissionMode::Granted => PermissionState::Granted,
            PermissionMode::Denied => PermissionState::Denied,
            PermissionMode::Prompt => self.ask().await?,
        };
        tracing::info!(permission = ?answer, "notification permission decided");
        *state = answer;
        Ok(answer)
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        println!("🔔 {}\n   {}", notification.title, notification.body);
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }
}
