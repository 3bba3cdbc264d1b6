//! The review and rating engine.
//!
//! Submissions require an authenticated customer and land as `pending`;
//! pending reviews never count toward the public aggregate. Moderation
//! decisions move counters into or out of the product's rating summary
//! atomically with the status write.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Result,
  config::ReviewConfig,
  engine::dispatch,
  error::Error,
  identity::CustomerId,
  notify::{Notification, NotificationSender},
  review::{RatingSummary, Review, ReviewStatus},
  store::{EngagementStore, ModerationOutcome},
};

pub struct ReviewEngine<S> {
  config:   ReviewConfig,
  store:    Arc<S>,
  notifier: Arc<dyn NotificationSender>,
}

impl<S: EngagementStore> ReviewEngine<S> {
  pub fn new(
    config: ReviewConfig,
    store: Arc<S>,
    notifier: Arc<dyn NotificationSender>,
  ) -> Self {
    Self { config, store, notifier }
  }

  /// Submit a review for a product.
  ///
  /// The credential gate comes first: an anonymous caller gets
  /// [`Error::Unauthorized`] even when the rest of the submission is also
  /// malformed. The new review becomes the customer's current review for
  /// the product; any previous current review is retired by the store in
  /// the same transaction.
  pub async fn submit(
    &self,
    customer: Option<&CustomerId>,
    product_id: &str,
    rating: i32,
    title: &str,
    description: &str,
  ) -> Result<Review> {
    let customer = customer.ok_or(Error::Unauthorized)?;

    let product_id = product_id.trim();
    if product_id.is_empty() {
      return Err(Error::InvalidInput("product_id is required".to_owned()));
    }
    if !(1..=5).contains(&rating) {
      return Err(Error::InvalidInput(
        "rating must be an integer between 1 and 5".to_owned(),
      ));
    }

    let verified_purchase = self
      .store
      .has_purchase(customer, product_id)
      .await
      .map_err(Error::upstream)?;

    let non_empty = |s: &str| {
      let s = s.trim();
      (!s.is_empty()).then(|| s.to_owned())
    };
    let review = Review {
      review_id: Uuid::new_v4(),
      product_id: product_id.to_owned(),
      customer_id: Some(customer.clone()),
      rating,
      title: non_empty(title),
      description: non_empty(description),
      status: ReviewStatus::Pending,
      verified_purchase,
      is_current: true,
      created_at: Utc::now(),
    };

    self
      .store
      .insert_review(review.clone())
      .await
      .map_err(Error::upstream)?;

    Ok(review)
  }

  /// Apply a moderation decision. Only `approved` and `rejected` are
  /// decisions; repeating one is harmless — the store keeps the counters
  /// neutral for a no-op status write.
  pub async fn moderate(
    &self,
    review_id: Uuid,
    decision: ReviewStatus,
  ) -> Result<Review> {
    if decision == ReviewStatus::Pending {
      return Err(Error::InvalidInput(
        "decision must be approved or rejected".to_owned(),
      ));
    }

    let (review, previous) = match self
      .store
      .set_review_status(review_id, decision)
      .await
      .map_err(Error::upstream)?
    {
      ModerationOutcome::Applied { review, previous } => (review, previous),
      ModerationOutcome::Missing => {
        return Err(Error::NotFound(format!("review {review_id}")));
      }
    };

    if self.config.notify_on_decision
      && previous != decision
      && let Some(customer) = &review.customer_id
    {
      dispatch(
        self.notifier.as_ref(),
        self.decision_notification(&review, customer),
      )
      .await;
    }

    Ok(review)
  }

  /// Current approved reviews for a product. Ordering is a presentation
  /// concern and not guaranteed here.
  pub async fn product_reviews(&self, product_id: &str) -> Result<Vec<Review>> {
    self
      .store
      .list_product_reviews(product_id.trim())
      .await
      .map_err(Error::upstream)
  }

  pub async fn rating_summary(&self, product_id: &str) -> Result<RatingSummary> {
    self
      .store
      .rating_summary(product_id.trim())
      .await
      .map_err(Error::upstream)
  }

  /// The requesting customer's own reviews for a product, any status.
  ///
  /// Deliberately lenient: an anonymous caller or a failing store read both
  /// yield an empty list so page rendering never blocks on this path.
  pub async fn customer_reviews(
    &self,
    customer: Option<&CustomerId>,
    product_id: &str,
  ) -> Vec<Review> {
    let Some(customer) = customer else { return Vec::new() };
    match self
      .store
      .list_customer_reviews(customer, product_id.trim())
      .await
    {
      Ok(reviews) => reviews,
      Err(err) => {
        tracing::warn!(error = %err, "customer review listing failed");
        Vec::new()
      }
    }
  }

  fn decision_notification(
    &self,
    review: &Review,
    customer: &CustomerId,
  ) -> Notification {
    Notification {
      template: self
        .config
        .decision_template
        .clone()
        .unwrap_or_else(|| "review-decision".to_owned()),
      recipient: customer.to_string(),
      variables: BTreeMap::from([
        ("review_id".to_owned(), review.review_id.to_string()),
        ("product_id".to_owned(), review.product_id.clone()),
        ("status".to_owned(), review.status.to_string()),
      ]),
    }
  }
}
