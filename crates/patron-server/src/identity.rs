//! The store-backed identity gate.
//!
//! Bearer tokens are issued and revoked by the commerce platform; this
//! service only resolves them. Tokens are never stored in the clear — the
//! lookup table holds SHA-256 hex digests, so a leaked database does not
//! leak credentials.

use std::sync::Arc;

use patron_core::{
  identity::{CustomerId, IdentityGate},
  store::EngagementStore,
};
use sha2::{Digest as _, Sha256};

/// SHA-256 hex digest of a bearer token, as stored in `customer_tokens`.
pub fn token_digest(token: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(token.as_bytes());
  hex::encode(hasher.finalize())
}

pub struct StoreIdentityGate<S> {
  store: Arc<S>,
}

impl<S> StoreIdentityGate<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }
}

#[async_trait::async_trait]
impl<S> IdentityGate for StoreIdentityGate<S>
where
  S: EngagementStore + 'static,
{
  async fn resolve(&self, bearer: &str) -> Option<CustomerId> {
    match self.store.resolve_token(&token_digest(bearer)).await {
      Ok(customer) => customer,
      Err(err) => {
        // Resolution failure degrades to anonymous; write paths surface it
        // as Unauthorized, read paths fall back to their defaults.
        tracing::warn!(error = %err, "credential resolution failed");
        None
      }
    }
  }
}
