//! Review and rating types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::identity::CustomerId;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewStatus {
  Pending,
  Approved,
  Rejected,
}

/// A customer's review of a product.
///
/// Exactly one review per (customer, product) pair is *current*; resubmission
/// retires the previous current review as a historical row rather than
/// mutating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:         Uuid,
  pub product_id:        String,
  /// `None` once a review has been anonymized.
  pub customer_id:       Option<CustomerId>,
  /// Integer in [1, 5]; enforced before any write.
  pub rating:            i32,
  pub title:             Option<String>,
  pub description:       Option<String>,
  pub status:            ReviewStatus,
  /// Stamped from the purchase record at submission time.
  pub verified_purchase: bool,
  pub is_current:        bool,
  pub created_at:        DateTime<Utc>,
}

/// Derived aggregate over a product's current approved reviews. The store
/// keeps the two counters; the average is always computed here, never stored,
/// so the three fields cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
  pub average_rating:   f64,
  pub total_reviews:    i64,
  pub total_rating_sum: i64,
}

impl RatingSummary {
  pub fn from_counters(total_reviews: i64, total_rating_sum: i64) -> Self {
    let average_rating = if total_reviews > 0 {
      total_rating_sum as f64 / total_reviews as f64
    } else {
      0.0
    };
    Self { average_rating, total_reviews, total_rating_sum }
  }

  pub fn zero() -> Self { Self::from_counters(0, 0) }
}
