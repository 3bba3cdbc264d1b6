//! JSON REST API for Patron.
//!
//! Exposes an axum [`Router`] backed by any
//! [`patron_core::store::EngagementStore`]. Transport, TLS, and token
//! provisioning are the caller's responsibility; credentials arrive as
//! `Authorization: Bearer …` headers and are resolved per request through
//! the injected [`IdentityGate`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/store", patron_api::api_router(state))
//! ```

pub mod contact;
pub mod error;
pub mod extract;
pub mod reviews;
pub mod wishlist;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use patron_core::{
  config::ContactConfig,
  engine::{ContactEngine, ReviewEngine, WishlistService},
  identity::IdentityGate,
  store::EngagementStore,
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub contact:  Arc<ContactEngine<S>>,
  pub reviews:  Arc<ReviewEngine<S>>,
  pub wishlist: Arc<WishlistService<S>>,
  pub gate:     Arc<dyn IdentityGate>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      contact:  Arc::clone(&self.contact),
      reviews:  Arc::clone(&self.reviews),
      wishlist: Arc::clone(&self.wishlist),
      gate:     Arc::clone(&self.gate),
    }
  }
}

impl<S: EngagementStore> ApiState<S> {
  pub fn contact_config(&self) -> &ContactConfig {
    self.contact.config()
  }
}

/// Build a fully-materialised API router for the given state.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: EngagementStore + 'static,
{
  Router::new()
    // Contact requests
    .route("/contact/requests", post(contact::submit::<S>))
    .route("/contact/requests/{id}", get(contact::get_one::<S>))
    .route("/contact/requests/{id}/status", post(contact::transition::<S>))
    .route("/contact/subscriptions", post(contact::subscribe::<S>))
    // Reviews
    .route("/reviews", post(reviews::submit::<S>))
    .route("/reviews/{id}/status", post(reviews::moderate::<S>))
    .route("/products/{product_id}/reviews", get(reviews::product_reviews::<S>))
    .route("/products/{product_id}/rating", get(reviews::product_rating::<S>))
    .route(
      "/products/{product_id}/reviews/mine",
      get(reviews::customer_reviews::<S>),
    )
    // Wishlist
    .route("/wishlist", get(wishlist::list::<S>).post(wishlist::add::<S>))
    .route("/wishlist/check", get(wishlist::check::<S>))
    .route("/wishlist/{product_id}", delete(wishlist::remove::<S>))
    .with_state(state)
}
