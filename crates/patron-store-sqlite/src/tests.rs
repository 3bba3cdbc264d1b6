//! Integration tests: the engines running against an in-memory database.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use patron_core::{
  Error,
  config::{ContactConfig, ReviewConfig},
  engine::{ContactEngine, ReviewEngine, WishlistOutcome, WishlistService},
  identity::CustomerId,
  notify::{Notification, NotificationSender, SendError},
  review::ReviewStatus,
  store::{EngagementStore, TransitionOutcome},
  ticket::{StatusChange, SubscriptionStatus},
};
use uuid::Uuid;

use crate::SqliteStore;

// ─── Harness ─────────────────────────────────────────────────────────────────

/// Captures every dispatched notification instead of delivering it.
#[derive(Default)]
struct RecordingNotifier {
  sent: Mutex<Vec<Notification>>,
}

#[async_trait::async_trait]
impl NotificationSender for RecordingNotifier {
  async fn send(&self, notification: Notification) -> Result<(), SendError> {
    self.sent.lock().unwrap().push(notification);
    Ok(())
  }
}

impl RecordingNotifier {
  fn sent(&self) -> Vec<Notification> {
    self.sent.lock().unwrap().clone()
  }
}

/// Always fails — used to prove notification delivery is best-effort.
struct FailingNotifier;

#[async_trait::async_trait]
impl NotificationSender for FailingNotifier {
  async fn send(&self, _notification: Notification) -> Result<(), SendError> {
    Err(SendError("smtp relay unreachable".to_owned()))
  }
}

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

fn contact_engine(
  store: &Arc<SqliteStore>,
  notifier: &Arc<RecordingNotifier>,
  config: ContactConfig,
) -> ContactEngine<SqliteStore> {
  ContactEngine::new(config, Arc::clone(store), notifier.clone())
}

fn review_engine(
  store: &Arc<SqliteStore>,
  notifier: &Arc<RecordingNotifier>,
  config: ReviewConfig,
) -> ReviewEngine<SqliteStore> {
  ReviewEngine::new(config, Arc::clone(store), notifier.clone())
}

fn payload(value: serde_json::Value) -> BTreeMap<String, serde_json::Value> {
  serde_json::from_value(value).unwrap()
}

fn order_issue_payload() -> BTreeMap<String, serde_json::Value> {
  payload(serde_json::json!({
    "subject": "Order issue",
    "message": "My order arrived damaged"
  }))
}

fn customer(id: &str) -> CustomerId {
  CustomerId::from(id)
}

// ─── Contact tickets ─────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_creates_ticket_in_initial_status() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();

  assert_eq!(ticket.status, "pending");
  assert_eq!(ticket.status_history.len(), 1);
  assert_eq!(ticket.status_history[0].to, "pending");
  assert!(ticket.status_history[0].from.is_none());

  let stored = engine.get(ticket.ticket_id).await.unwrap();
  assert_eq!(stored.email, "user@test.com");
  assert_eq!(stored.payload["subject"], "Order issue");
  assert_eq!(stored.source, "contact_page");
}

#[tokio::test]
async fn submit_rejects_malformed_email() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let err = engine
    .submit("not-an-email", &order_issue_payload(), "contact_page")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn submit_names_the_missing_required_field() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let err = engine
    .submit(
      "user@test.com",
      &payload(serde_json::json!({ "subject": "No message" })),
      "contact_page",
    )
    .await
    .unwrap_err();
  assert!(err.to_string().contains("message"), "{err}");
}

#[tokio::test]
async fn submit_sanitizes_the_stored_payload() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let ticket = engine
    .submit(
      "user@test.com",
      &payload(serde_json::json!({
        "subject": "Order issue",
        "message": "My order arrived damaged",
        "phone": "",
        "is_return_request": false,
        "mystery_field": "dropped"
      })),
      "contact_page",
    )
    .await
    .unwrap();

  assert!(!ticket.payload.contains_key("phone"));
  assert!(!ticket.payload.contains_key("is_return_request"));
  assert!(!ticket.payload.contains_key("mystery_field"));
}

#[tokio::test]
async fn acknowledgement_fires_when_configured() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let mut config = ContactConfig::default();
  config.notifications.send_on_create = true;
  config.notifications.acknowledgement_template = Some("contact-ack".to_owned());
  let engine = contact_engine(&s, &notifier, config);

  engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();

  let sent = notifier.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].template, "contact-ack");
  assert_eq!(sent[0].recipient, "user@test.com");
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_submission() {
  let s = store().await;
  let mut config = ContactConfig::default();
  config.notifications.send_on_create = true;
  let engine =
    ContactEngine::new(config, Arc::clone(&s), Arc::new(FailingNotifier));

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();
  assert!(engine.get(ticket.ticket_id).await.is_ok());
}

#[tokio::test]
async fn transitions_walk_the_configured_machine() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();

  for status in ["in_progress", "resolved", "closed"] {
    engine.transition(ticket.ticket_id, status, None).await.unwrap();
  }

  let closed = engine.get(ticket.ticket_id).await.unwrap();
  assert_eq!(closed.status, "closed");
  assert_eq!(closed.status_history.len(), 4);
  assert_eq!(closed.status_history.last().unwrap().to, "closed");
  assert_eq!(
    closed.status_history.last().unwrap().from.as_deref(),
    Some("resolved")
  );
}

#[tokio::test]
async fn transition_outside_the_table_is_rejected() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();

  // Skipping straight to closed is not an edge.
  let err = engine
    .transition(ticket.ticket_id, "closed", None)
    .await
    .unwrap_err();
  assert!(
    matches!(&err, Error::InvalidTransition { from, to } if from.as_str() == "pending" && to.as_str() == "closed")
  );

  // Neither is a status outside the set entirely.
  let err = engine
    .transition(ticket.ticket_id, "escalated", None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidTransition { .. }));

  // The failed attempts left no history behind.
  let unchanged = engine.get(ticket.ticket_id).await.unwrap();
  assert_eq!(unchanged.status_history.len(), 1);
}

#[tokio::test]
async fn transition_on_unknown_ticket_is_not_found() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let err = engine
    .transition(Uuid::new_v4(), "in_progress", None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn status_option_notification_carries_its_subject() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();
  engine
    .transition(ticket.ticket_id, "in_progress", None)
    .await
    .unwrap();

  let sent = notifier.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].recipient, "user@test.com");
  assert_eq!(
    sent[0].variables.get("subject").map(String::as_str),
    Some("Your request is being processed")
  );
  assert_eq!(
    sent[0].variables.get("status").map(String::as_str),
    Some("in_progress")
  );
}

#[tokio::test]
async fn closing_requires_a_note_when_configured() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let mut config = ContactConfig::default();
  config.require_note_on_final = true;
  let engine = contact_engine(&s, &notifier, config);

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();
  engine.transition(ticket.ticket_id, "in_progress", None).await.unwrap();
  engine.transition(ticket.ticket_id, "resolved", None).await.unwrap();

  let err = engine
    .transition(ticket.ticket_id, "closed", Some("   "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));

  let closed = engine
    .transition(ticket.ticket_id, "closed", Some("duplicate of 4711"))
    .await
    .unwrap();
  assert_eq!(
    closed.status_history.last().unwrap().note.as_deref(),
    Some("duplicate of 4711")
  );
}

#[tokio::test]
async fn final_status_notification_fires_when_configured() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let mut config = ContactConfig::default();
  config.notifications.send_on_final_status = true;
  let engine = contact_engine(&s, &notifier, config);

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();
  engine.transition(ticket.ticket_id, "in_progress", None).await.unwrap();
  engine.transition(ticket.ticket_id, "resolved", None).await.unwrap();
  engine.transition(ticket.ticket_id, "closed", None).await.unwrap();

  let templates: Vec<String> =
    notifier.sent().into_iter().map(|n| n.template).collect();
  assert!(templates.contains(&"contact-request-closed".to_owned()));
}

#[tokio::test]
async fn stale_compare_and_set_reports_the_actual_status() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  let ticket = engine
    .submit("user@test.com", &order_issue_payload(), "contact_page")
    .await
    .unwrap();
  engine.transition(ticket.ticket_id, "in_progress", None).await.unwrap();

  // A writer that still believes the ticket is pending loses the race.
  let outcome = s
    .apply_transition(
      ticket.ticket_id,
      StatusChange {
        from: Some("pending".to_owned()),
        to:   "in_progress".to_owned(),
        at:   chrono::Utc::now(),
        note: None,
      },
    )
    .await
    .unwrap();
  assert!(
    matches!(outcome, TransitionOutcome::StaleStatus { actual } if actual == "in_progress")
  );

  // The losing attempt appended nothing.
  let unchanged = engine.get(ticket.ticket_id).await.unwrap();
  assert_eq!(unchanged.status_history.len(), 2);
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_upsert_is_keyed_by_normalized_email() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  engine.upsert_subscription("A@Example.com", "footer_form").await.unwrap();
  let second = engine
    .upsert_subscription("a@example.com ", "checkout_banner")
    .await
    .unwrap();

  assert_eq!(second.email, "a@example.com");
  assert_eq!(second.source, "checkout_banner");
  assert_eq!(second.status, SubscriptionStatus::Subscribed);

  // Exactly one record, carrying the latest source.
  let stored = s.get_subscription("a@example.com").await.unwrap().unwrap();
  assert_eq!(stored.source, "checkout_banner");
  assert!(s.get_subscription("A@Example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn subscription_rejects_empty_and_malformed_emails() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = contact_engine(&s, &notifier, ContactConfig::default());

  assert!(matches!(
    engine.upsert_subscription("   ", "footer_form").await,
    Err(Error::InvalidInput(_))
  ));
  assert!(matches!(
    engine.upsert_subscription("nope", "footer_form").await,
    Err(Error::InvalidInput(_))
  ));
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_review_submission_is_unauthorized() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());

  // The credential gate is checked before anything else — the rating here
  // is also invalid, but the caller must still see Unauthorized.
  let err = engine.submit(None, "prod_1", 0, "", "").await.unwrap_err();
  assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn rating_must_be_within_bounds() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");

  for bad in [0, 6, -1] {
    let err = engine
      .submit(Some(&alice), "prod_1", bad, "t", "d")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "rating {bad}");
  }

  let review = engine
    .submit(Some(&alice), "prod_1", 5, "Great", "Works as advertised")
    .await
    .unwrap();
  assert_eq!(review.rating, 5);
  assert_eq!(review.status, ReviewStatus::Pending);
}

#[tokio::test]
async fn pending_reviews_stay_out_of_the_public_aggregate() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");

  engine.submit(Some(&alice), "prod_1", 4, "", "").await.unwrap();

  let summary = engine.rating_summary("prod_1").await.unwrap();
  assert_eq!(summary.total_reviews, 0);
  assert_eq!(summary.average_rating, 0.0);
  assert!(engine.product_reviews("prod_1").await.unwrap().is_empty());
}

#[tokio::test]
async fn approval_moves_the_aggregate() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");
  let bob = customer("cus_bob");

  let first = engine.submit(Some(&alice), "prod_1", 4, "", "").await.unwrap();
  let second = engine.submit(Some(&bob), "prod_1", 3, "", "").await.unwrap();
  engine.moderate(first.review_id, ReviewStatus::Approved).await.unwrap();
  engine.moderate(second.review_id, ReviewStatus::Approved).await.unwrap();

  let summary = engine.rating_summary("prod_1").await.unwrap();
  assert_eq!(summary.total_reviews, 2);
  assert_eq!(summary.total_rating_sum, 7);
  assert_eq!(summary.average_rating, 3.5);
  assert_eq!(engine.product_reviews("prod_1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn approving_twice_never_double_counts() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");

  let review = engine.submit(Some(&alice), "prod_1", 5, "", "").await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Approved).await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Approved).await.unwrap();

  let summary = engine.rating_summary("prod_1").await.unwrap();
  assert_eq!(summary.total_reviews, 1);
  assert_eq!(summary.total_rating_sum, 5);
}

#[tokio::test]
async fn rejection_after_approval_decrements_exactly_once() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");

  let review = engine.submit(Some(&alice), "prod_1", 5, "", "").await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Approved).await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Rejected).await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Rejected).await.unwrap();

  let summary = engine.rating_summary("prod_1").await.unwrap();
  assert_eq!(summary.total_reviews, 0);
  assert_eq!(summary.total_rating_sum, 0);
}

#[tokio::test]
async fn resubmission_retires_the_previous_current_review() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");

  let first = engine.submit(Some(&alice), "prod_1", 2, "Meh", "").await.unwrap();
  engine.moderate(first.review_id, ReviewStatus::Approved).await.unwrap();
  assert_eq!(engine.rating_summary("prod_1").await.unwrap().total_reviews, 1);

  // A replacement lands as pending and pulls the old one out of the
  // aggregate immediately.
  let second = engine
    .submit(Some(&alice), "prod_1", 5, "Much better", "")
    .await
    .unwrap();
  let summary = engine.rating_summary("prod_1").await.unwrap();
  assert_eq!(summary.total_reviews, 0);

  engine.moderate(second.review_id, ReviewStatus::Approved).await.unwrap();
  let summary = engine.rating_summary("prod_1").await.unwrap();
  assert_eq!(summary.total_reviews, 1);
  assert_eq!(summary.total_rating_sum, 5);

  // Only the replacement is surfaced publicly; the customer sees both.
  let public = engine.product_reviews("prod_1").await.unwrap();
  assert_eq!(public.len(), 1);
  assert_eq!(public[0].review_id, second.review_id);

  let own = engine.customer_reviews(Some(&alice), "prod_1").await;
  assert_eq!(own.len(), 2);
}

#[tokio::test]
async fn customer_review_listing_is_lenient() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());

  assert!(engine.customer_reviews(None, "prod_1").await.is_empty());
}

#[tokio::test]
async fn customer_sees_own_pending_and_rejected_reviews() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");

  let review = engine.submit(Some(&alice), "prod_1", 1, "", "").await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Rejected).await.unwrap();

  let own = engine.customer_reviews(Some(&alice), "prod_1").await;
  assert_eq!(own.len(), 1);
  assert_eq!(own[0].status, ReviewStatus::Rejected);

  // Another customer sees nothing on this path.
  assert!(engine.customer_reviews(Some(&customer("cus_bob")), "prod_1").await.is_empty());
}

#[tokio::test]
async fn verified_purchase_is_stamped_from_the_purchase_record() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());
  let alice = customer("cus_alice");
  let bob = customer("cus_bob");

  s.record_purchase(&alice, "prod_1").await.unwrap();

  let verified = engine.submit(Some(&alice), "prod_1", 5, "", "").await.unwrap();
  assert!(verified.verified_purchase);

  let unverified = engine.submit(Some(&bob), "prod_1", 4, "", "").await.unwrap();
  assert!(!unverified.verified_purchase);
}

#[tokio::test]
async fn moderation_rejects_unknown_reviews_and_non_decisions() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = review_engine(&s, &notifier, ReviewConfig::default());

  let err = engine
    .moderate(Uuid::new_v4(), ReviewStatus::Approved)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let err = engine
    .moderate(Uuid::new_v4(), ReviewStatus::Pending)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn decision_notification_reaches_the_customer() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let config = ReviewConfig { notify_on_decision: true, decision_template: None };
  let engine = review_engine(&s, &notifier, config);
  let alice = customer("cus_alice");

  let review = engine.submit(Some(&alice), "prod_1", 5, "", "").await.unwrap();
  engine.moderate(review.review_id, ReviewStatus::Approved).await.unwrap();

  let sent = notifier.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].template, "review-decision");
  assert_eq!(sent[0].recipient, "cus_alice");
  assert_eq!(
    sent[0].variables.get("status").map(String::as_str),
    Some("approved")
  );
}

// ─── Wishlist ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wishlist_add_is_idempotent() {
  let s = store().await;
  let service = WishlistService::new(Arc::clone(&s));
  let alice = customer("cus_alice");

  service.add(Some(&alice), "prod_1").await.unwrap();
  service.add(Some(&alice), "prod_1").await.unwrap();

  let listing = service.list(Some(&alice)).await.unwrap();
  let WishlistOutcome::Granted(products) = listing else {
    panic!("expected a granted listing")
  };
  assert_eq!(products.len(), 1);
  assert!(products.contains("prod_1"));
}

#[tokio::test]
async fn removing_a_non_member_is_a_success() {
  let s = store().await;
  let service = WishlistService::new(Arc::clone(&s));
  let alice = customer("cus_alice");

  let outcome = service.remove(Some(&alice), "prod_1").await.unwrap();
  assert_eq!(outcome, WishlistOutcome::Granted(()));
}

#[tokio::test]
async fn anonymous_callers_get_structured_outcomes() {
  let s = store().await;
  let service = WishlistService::new(Arc::clone(&s));

  assert_eq!(
    service.add(None, "prod_1").await.unwrap(),
    WishlistOutcome::NotAuthenticated
  );
  assert_eq!(
    service.list(None).await.unwrap(),
    WishlistOutcome::NotAuthenticated
  );
  // The membership check is fail-closed, not an outcome.
  assert!(!service.contains(None, "prod_1").await);
}

#[tokio::test]
async fn membership_follows_add_and_remove() {
  let s = store().await;
  let service = WishlistService::new(Arc::clone(&s));
  let alice = customer("cus_alice");

  assert!(!service.contains(Some(&alice), "prod_1").await);
  service.add(Some(&alice), "prod_1").await.unwrap();
  assert!(service.contains(Some(&alice), "prod_1").await);
  service.remove(Some(&alice), "prod_1").await.unwrap();
  assert!(!service.contains(Some(&alice), "prod_1").await);
}

#[tokio::test]
async fn wishlists_are_scoped_per_customer() {
  let s = store().await;
  let service = WishlistService::new(Arc::clone(&s));
  let alice = customer("cus_alice");
  let bob = customer("cus_bob");

  service.add(Some(&alice), "prod_1").await.unwrap();
  assert!(!service.contains(Some(&bob), "prod_1").await);
}

#[tokio::test]
async fn empty_product_id_is_invalid_input() {
  let s = store().await;
  let service = WishlistService::new(Arc::clone(&s));
  let alice = customer("cus_alice");

  let err = service.add(Some(&alice), "  ").await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));
}

// ─── Credential tokens ───────────────────────────────────────────────────────

#[tokio::test]
async fn token_digests_resolve_to_their_customer() {
  let s = store().await;
  let alice = customer("cus_alice");

  s.register_token("digest-abc", &alice).await.unwrap();

  assert_eq!(s.resolve_token("digest-abc").await.unwrap(), Some(alice));
  assert_eq!(s.resolve_token("digest-unknown").await.unwrap(), None);
}
