//! Outbound user notifications.
//!
//! Best-effort, fire-and-forget: the cycle logs a failed send and moves on.
//! Nothing in the core retries a notification or rolls back state because
//! one failed.

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

use giftflow_core::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("notification send failed: {0}")]
pub struct NotifyError(pub String);

/// Best-effort messaging channel to the account holder.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: AccountId, text: &str) -> Result<(), NotifyError>;
}

/// Notifier that only writes to the log. Used when no messaging channel is
/// configured.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, recipient: AccountId, text: &str) -> Result<(), NotifyError> {
        info!(recipient = %recipient, text, "notification (log only)");
        Ok(())
    }
}

/// Notifier that records every message; for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(AccountId, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(AccountId, String)> {
        self.messages.lock().expect("notifier lock poisoned").clone()
    }

    pub fn sent_to(&self, recipient: AccountId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == recipient)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: AccountId, text: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .map_err(|_| NotifyError("notifier lock poisoned".to_string()))?
            .push((recipient, text.to_string()));
        Ok(())
    }
}
