//! Notification boundary.
//!
//! Email transport is an external collaborator; services talk to it
//! through [`NotificationSender`]. Send failures never roll back the
//! database work that preceded them — callers log and surface a flag.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use authhub_core::result::AppResult;

/// The kinds of account emails AuthHub produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTemplate {
    /// Welcome email carrying the initial credentials.
    NewUser,
    /// Confirmation that a password was changed administratively.
    ChangePassword,
    /// Password reset instructions carrying the reset key.
    PasswordReset,
}

/// Template variables for one notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationContext {
    /// The recipient's login id.
    pub login_id: String,
    /// Plaintext initial password, for `NewUser` only.
    pub password: Option<String>,
    /// Pending reset key, for `PasswordReset` only.
    pub reset_key: Option<String>,
}

/// Outbound notification transport.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends one notification; returns whether delivery was accepted.
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &str,
        context: NotificationContext,
    ) -> AppResult<bool>;
}

/// Sender that logs and reports success. Used by tests and provisioning
/// scripts that run without an email transport.
#[derive(Debug, Clone, Default)]
pub struct NoopSender;

#[async_trait]
impl NotificationSender for NoopSender {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &str,
        context: NotificationContext,
    ) -> AppResult<bool> {
        info!(
            ?template,
            recipient,
            login_id = %context.login_id,
            "Notification suppressed (no transport configured)"
        );
        Ok(true)
    }
}
