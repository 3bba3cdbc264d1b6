//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. JSON maps (ticket payload,
//! subscription metadata) are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings; enum discriminants as their lowercase
//! string forms.

use std::collections::BTreeMap;
use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use patron_core::{
  identity::CustomerId,
  review::{Review, ReviewStatus},
  ticket::{ContactTicket, StatusChange, Subscription, SubscriptionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_json_map(map: &BTreeMap<String, serde_json::Value>) -> Result<String> {
  Ok(serde_json::to_string(map)?)
}

pub fn decode_json_map(s: &str) -> Result<BTreeMap<String, serde_json::Value>> {
  Ok(serde_json::from_str(s)?)
}

pub fn decode_review_status(s: &str) -> Result<ReviewStatus> {
  ReviewStatus::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown review status: {s:?}")))
}

pub fn decode_subscription_status(s: &str) -> Result<SubscriptionStatus> {
  SubscriptionStatus::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown subscription status: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `contact_tickets` row.
pub struct RawTicket {
  pub ticket_id:  String,
  pub email:      String,
  pub status:     String,
  pub payload:    String,
  pub source:     String,
  pub created_at: String,
  pub updated_at: String,
}

/// Raw strings read from a `ticket_status_history` row, creation entry first.
pub struct RawStatusChange {
  pub from_status: Option<String>,
  pub to_status:   String,
  pub note:        Option<String>,
  pub recorded_at: String,
}

impl RawStatusChange {
  pub fn into_change(self) -> Result<StatusChange> {
    Ok(StatusChange {
      from: self.from_status,
      to:   self.to_status,
      at:   decode_dt(&self.recorded_at)?,
      note: self.note,
    })
  }
}

impl RawTicket {
  pub fn into_ticket(self, history: Vec<RawStatusChange>) -> Result<ContactTicket> {
    Ok(ContactTicket {
      ticket_id: decode_uuid(&self.ticket_id)?,
      email: self.email,
      status: self.status,
      payload: decode_json_map(&self.payload)?,
      source: self.source,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      status_history: history
        .into_iter()
        .map(RawStatusChange::into_change)
        .collect::<Result<_>>()?,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub email:      String,
  pub status:     String,
  pub source:     String,
  pub metadata:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      email:      self.email,
      status:     decode_subscription_status(&self.status)?,
      source:     self.source,
      metadata:   decode_json_map(&self.metadata)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub review_id:         String,
  pub product_id:        String,
  pub customer_id:       Option<String>,
  pub rating:            i64,
  pub title:             Option<String>,
  pub description:       Option<String>,
  pub status:            String,
  pub verified_purchase: bool,
  pub is_current:        bool,
  pub created_at:        String,
}

impl RawReview {
  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id: decode_uuid(&self.review_id)?,
      product_id: self.product_id,
      customer_id: self.customer_id.map(CustomerId),
      rating: self.rating as i32,
      title: self.title,
      description: self.description,
      status: decode_review_status(&self.status)?,
      verified_purchase: self.verified_purchase,
      is_current: self.is_current,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
