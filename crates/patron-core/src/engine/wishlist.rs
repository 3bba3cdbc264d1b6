//! The wishlist set service.
//!
//! Anonymous browsing is a normal, frequent case here, so a missing
//! credential is a structured [`WishlistOutcome::NotAuthenticated`] rather
//! than an error. Membership checks are fail-closed: any failure reads as
//! "not in the wishlist" so page rendering never blocks on this path.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::{
  Result, error::Error, identity::CustomerId, store::EngagementStore,
};

/// Outcome of an operation that needs a customer to mean anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistOutcome<T> {
  Granted(T),
  NotAuthenticated,
}

pub struct WishlistService<S> {
  store: Arc<S>,
}

impl<S: EngagementStore> WishlistService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Idempotent set insert: adding an existing member is a success.
  pub async fn add(
    &self,
    customer: Option<&CustomerId>,
    product_id: &str,
  ) -> Result<WishlistOutcome<()>> {
    let Some(customer) = customer else {
      return Ok(WishlistOutcome::NotAuthenticated);
    };
    let product_id = required_product_id(product_id)?;
    self
      .store
      .wishlist_add(customer, product_id, Utc::now())
      .await
      .map_err(Error::upstream)?;
    Ok(WishlistOutcome::Granted(()))
  }

  /// Removing a non-member is a success, not an error.
  pub async fn remove(
    &self,
    customer: Option<&CustomerId>,
    product_id: &str,
  ) -> Result<WishlistOutcome<()>> {
    let Some(customer) = customer else {
      return Ok(WishlistOutcome::NotAuthenticated);
    };
    let product_id = required_product_id(product_id)?;
    self
      .store
      .wishlist_remove(customer, product_id)
      .await
      .map_err(Error::upstream)?;
    Ok(WishlistOutcome::Granted(()))
  }

  /// Fail-closed membership check: anonymous callers and store failures
  /// both read as `false`, with the failure logged rather than surfaced.
  pub async fn contains(
    &self,
    customer: Option<&CustomerId>,
    product_id: &str,
  ) -> bool {
    let Some(customer) = customer else { return false };
    let product_id = product_id.trim();
    if product_id.is_empty() {
      return false;
    }
    match self.store.wishlist_contains(customer, product_id).await {
      Ok(member) => member,
      Err(err) => {
        tracing::warn!(error = %err, "wishlist membership check failed");
        false
      }
    }
  }

  /// The customer's full wishlist. Unlike `contains`, a store failure here
  /// surfaces as [`Error::Upstream`].
  pub async fn list(
    &self,
    customer: Option<&CustomerId>,
  ) -> Result<WishlistOutcome<BTreeSet<String>>> {
    let Some(customer) = customer else {
      return Ok(WishlistOutcome::NotAuthenticated);
    };
    self
      .store
      .wishlist_list(customer)
      .await
      .map(WishlistOutcome::Granted)
      .map_err(Error::upstream)
  }
}

fn required_product_id(product_id: &str) -> Result<&str> {
  let product_id = product_id.trim();
  if product_id.is_empty() {
    return Err(Error::InvalidInput("product_id is required".to_owned()));
  }
  Ok(product_id)
}
