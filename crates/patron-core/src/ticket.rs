//! Contact ticket and subscription types.
//!
//! Tickets move through a configured status machine; every successful move is
//! recorded in `status_history`, which is append-only. Tickets are never
//! hard-deleted — the final status is terminal but retained.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// One entry of a ticket's status history. `from` is `None` only for the
/// creation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
  pub from: Option<String>,
  pub to:   String,
  pub at:   DateTime<Utc>,
  pub note: Option<String>,
}

/// A contact/support request tracked through its status lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactTicket {
  pub ticket_id:      Uuid,
  pub email:          String,
  /// Always a member of the configured status set.
  pub status:         String,
  /// Schema-validated field values; unknown keys are never stored.
  pub payload:        BTreeMap<String, serde_json::Value>,
  /// Free-text origin tag, e.g. "contact_page".
  pub source:         String,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  /// Append-only; the last entry's `to` equals `status`.
  pub status_history: Vec<StatusChange>,
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionStatus {
  Subscribed,
  Unsubscribed,
}

/// A newsletter subscription record, keyed by normalized lowercase email.
/// Resubmission updates the single record rather than duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
  pub email:      String,
  pub status:     SubscriptionStatus,
  pub source:     String,
  pub metadata:   BTreeMap<String, serde_json::Value>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
