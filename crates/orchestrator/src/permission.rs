use std::sync::Arc;

use shared::domain::PermissionState;
use tokio::sync::Mutex;

use crate::{error::error_message, providers::NotificationPlatform};

/// Guards notification delivery behind the platform permission.
///
/// Every [`ensure_granted`](Self::ensure_granted) call asks the platform
/// again; the stored state only mirrors the latest answer. Platform errors
/// count as `Denied`.
pub struct PermissionGate {
    platform: Arc<dyn NotificationPlatform>,
    state: Mutex<PermissionState>,
}

impl PermissionGate {
    pub fn new(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self {
            platform,
            state: Mutex::new(PermissionState::Unknown),
        }
    }

    pub async fn state(&self) -> PermissionState {
        *self.state.lock().await
    }

    pub async fn ensure_granted(&self) -> bool {
        let resolved = match self.platform.is_permission_granted().await {
            Ok(true) => PermissionState::Granted,
            Ok(false) => self.request().await,
            Err(err) => {
                tracing::warn!(error = %error_message(&err), "notification permission query failed");
                PermissionState::Denied
            }
        };

        let mut state = self.state.lock().await;
        if *state != resolved {
            tracing::debug!(from = ?*state, to = ?resolved, "notification permission changed");
        }
        *state = resolved;
        resolved == PermissionState::Granted
    }

    async fn request(&self) -> PermissionState {
        match self.platform.request_permission().await {
            Ok(PermissionState::Granted) => PermissionState::Granted,
            Ok(_) => PermissionState::Denied,
            Err(err) => {
                tracing::warn!(error = %error_message(&err), "notification permission request failed");
                PermissionState::Denied
            }
        }
    }
}
