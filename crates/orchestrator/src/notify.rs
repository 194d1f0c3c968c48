use std::sync::Arc;

use shared::domain::{Notification, NotificationCategory};

use crate::{error::error_message, permission::PermissionGate, providers::NotificationPlatform};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// Permission was not granted; the platform was never called.
    Suppressed,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

pub struct NotificationDispatcher {
    gate: Arc<PermissionGate>,
    platform: Arc<dyn NotificationPlatform>,
}

impl NotificationDispatcher {
    pub fn new(gate: Arc<PermissionGate>, platform: Arc<dyn NotificationPlatform>) -> Self {
        Self { gate, platform }
    }

    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    pub async fn notify(
        &self,
        category: NotificationCategory,
        title: Option<&str>,
        body: impl Into<String>,
    ) -> DispatchOutcome {
        self.dispatch(Notification::new(category, title, body)).await
    }

    pub async fn dispatch(&self, notification: Notification) -> DispatchOutcome {
        if !self.gate.ensure_granted().await {
            tracing::warn!(
                category = ?notification.category,
                "notification permission not granted; notification suppressed"
            );
            return DispatchOutcome::Suppressed;
        }

        match self.platform.send(&notification).await {
            Ok(()) => {
                tracing::info!(category = ?notification.category, body = %notification.body, "notification sent");
                DispatchOutcome::Delivered
            }
            Err(err) => {
                let reason = error_message(&err);
                tracing::error!(category = ?notification.category, error = %reason, "failed to send notification");
                DispatchOutcome::Failed(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Effects, FakeNotifications};

    fn dispatcher(platform: &FakeNotifications) -> NotificationDispatcher {
        let platform: Arc<dyn NotificationPlatform> = Arc::new(platform.clone());
        NotificationDispatcher::new(Arc::new(PermissionGate::new(platform.clone())), platform)
    }

    #[tokio::test]
    async fn delivers_when_permission_is_granted() {
        let platform = FakeNotifications::granted(Effects::default());
        let outcome = dispatcher(&platform)
            .notify(NotificationCategory::Success, None, "saved")
            .await;
        assert_eq!(outcome, DispatchOutcome::Delivered);

        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "✅ Operation succeeded");
        assert_eq!(sent[0].body, "saved");
    }

    #[tokio::test]
    async fn denied_permission_suppresses_without_calling_the_platform() {
        let platform = FakeNotifications::prompting(
            Effects::default(),
            shared::domain::PermissionState::Denied,
        );
        let outcome = dispatcher(&platform)
            .dispatch(Notification::error("boom"))
            .await;
        assert_eq!(outcome, DispatchOutcome::Suppressed);
        assert!(!outcome.is_delivered());
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn platform_send_errors_are_reported_distinctly() {
        let platform = FakeNotifications::granted(Effects::default()).with_send_failure("bus offline");
        let outcome = dispatcher(&platform)
            .notify(NotificationCategory::Info, Some("Hello"), "body")
            .await;
        assert_eq!(outcome, DispatchOutcome::Failed("bus offline".into()));
    }
}
