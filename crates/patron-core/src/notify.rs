//! The notification capability consumed by the engines.
//!
//! Delivery (email, SMS, whatever the dispatcher maps a template to) is an
//! external collaborator. Engines fire notifications best-effort after the
//! triggering state change commits; a send failure is logged and never rolls
//! anything back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A templated message handed to the external dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  /// Dispatcher-side template identifier.
  pub template:  String,
  /// Opaque recipient address or identifier; the dispatcher resolves it.
  pub recipient: String,
  /// Template substitution variables.
  pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
#[error("notification send failed: {0}")]
pub struct SendError(pub String);

#[async_trait::async_trait]
pub trait NotificationSender: Send + Sync {
  async fn send(&self, notification: Notification) -> Result<(), SendError>;
}
