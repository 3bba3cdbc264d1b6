//! The default notification sender: structured log lines.
//!
//! Real delivery belongs to the platform's dispatcher. Logging keeps the
//! engines' best-effort contract observable without coupling this binary to
//! a transport.

use patron_core::notify::{Notification, NotificationSender, SendError};

pub struct LogNotifier;

#[async_trait::async_trait]
impl NotificationSender for LogNotifier {
  async fn send(&self, notification: Notification) -> Result<(), SendError> {
    tracing::info!(
      template = %notification.template,
      recipient = %notification.recipient,
      variables = ?notification.variables,
      "notification dispatched"
    );
    Ok(())
  }
}
