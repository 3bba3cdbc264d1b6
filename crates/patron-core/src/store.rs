//! The `EngagementStore` trait — the persistence capability consumed by the
//! engines.
//!
//! Backends keep their own error type (the associated `Error`); every backend
//! error that reaches an engine is wrapped as
//! [`Error::Upstream`](crate::Error). Domain outcomes the engines must react
//! to — a missing row, a stale status observed by a compare-and-set — are
//! expressed as enum variants rather than errors, so the taxonomy mapping
//! stays in one place.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes (tokio with axum).

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  identity::CustomerId,
  review::{RatingSummary, Review, ReviewStatus},
  ticket::{ContactTicket, StatusChange, Subscription},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of the optimistic ticket-status compare-and-set.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
  /// The transition applied; the ticket is returned with its history.
  Applied(ContactTicket),
  /// A concurrent transition moved the ticket first.
  StaleStatus { actual: String },
  /// No such ticket.
  Missing,
}

/// Result of a moderation status write.
#[derive(Debug, Clone)]
pub enum ModerationOutcome {
  Applied { review: Review, previous: ReviewStatus },
  Missing,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

pub trait EngagementStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Contact tickets ───────────────────────────────────────────────────

  /// Persist a freshly-built ticket together with its creation history
  /// entry, atomically.
  fn insert_ticket(
    &self,
    ticket: ContactTicket,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a ticket with its full status history, oldest entry first.
  fn get_ticket(
    &self,
    ticket_id: Uuid,
  ) -> impl Future<Output = Result<Option<ContactTicket>, Self::Error>> + Send + '_;

  /// Apply a status change if and only if the ticket's current status still
  /// equals `change.from`; the status update and the history append commit
  /// in one transaction. Concurrent transitions on the same ticket are
  /// serialized by this check — no two can apply from the same stale status.
  fn apply_transition(
    &self,
    ticket_id: Uuid,
    change: StatusChange,
  ) -> impl Future<Output = Result<TransitionOutcome, Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Insert or update the record keyed by `subscription.email`, returning
  /// the stored row (`created_at` of the original record is preserved).
  fn upsert_subscription(
    &self,
    subscription: Subscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  fn get_subscription<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + 'a;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Persist a new current review. The submitting customer's previous
  /// current review for the product, if any, is retired in the same
  /// transaction, and its aggregate contribution removed if it was approved.
  fn insert_review(
    &self,
    review: Review,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_review(
    &self,
    review_id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Set a review's moderation status. Counter updates for transitions into
  /// or out of `approved` commit atomically with the status write; writing
  /// the status a review already has is counter-neutral.
  fn set_review_status(
    &self,
    review_id: Uuid,
    status: ReviewStatus,
  ) -> impl Future<Output = Result<ModerationOutcome, Self::Error>> + Send + '_;

  /// Current approved reviews for a product.
  fn list_product_reviews<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + 'a;

  /// All of one customer's reviews for a product, any status, newest first.
  fn list_customer_reviews<'a>(
    &'a self,
    customer_id: &'a CustomerId,
    product_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + 'a;

  fn rating_summary<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<RatingSummary, Self::Error>> + Send + 'a;

  // ── Purchases (platform-synced) ───────────────────────────────────────

  fn has_purchase<'a>(
    &'a self,
    customer_id: &'a CustomerId,
    product_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Sync hook for the commerce platform; idempotent.
  fn record_purchase<'a>(
    &'a self,
    customer_id: &'a CustomerId,
    product_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Wishlist ──────────────────────────────────────────────────────────

  /// Idempotent set insert.
  fn wishlist_add<'a>(
    &'a self,
    customer_id: &'a CustomerId,
    product_id: &'a str,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Removing a non-member is a successful no-op.
  fn wishlist_remove<'a>(
    &'a self,
    customer_id: &'a CustomerId,
    product_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn wishlist_contains<'a>(
    &'a self,
    customer_id: &'a CustomerId,
    product_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn wishlist_list<'a>(
    &'a self,
    customer_id: &'a CustomerId,
  ) -> impl Future<Output = Result<BTreeSet<String>, Self::Error>> + Send + 'a;

  // ── Credential tokens ─────────────────────────────────────────────────

  /// Look up the customer a token digest was provisioned for.
  fn resolve_token<'a>(
    &'a self,
    digest: &'a str,
  ) -> impl Future<Output = Result<Option<CustomerId>, Self::Error>> + Send + 'a;

  /// Provision a token digest for a customer (platform-side operation).
  fn register_token<'a>(
    &'a self,
    digest: &'a str,
    customer_id: &'a CustomerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
