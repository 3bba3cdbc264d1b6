//! Per-request identity extraction.

use std::convert::Infallible;

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use patron_core::{identity::CustomerId, store::EngagementStore};

use crate::ApiState;

/// The caller's resolved identity, if any.
///
/// Extraction never rejects: a missing header, a non-bearer scheme, or a
/// token the gate cannot resolve all yield `Identity(None)`. Handlers that
/// require a customer pass the `None` into the engine, which answers with
/// the appropriate structured result.
pub struct Identity(pub Option<CustomerId>);

impl<S> FromRequestParts<ApiState<S>> for Identity
where
  S: EngagementStore + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let bearer = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .map(str::trim)
      .filter(|t| !t.is_empty());

    let customer = match bearer {
      Some(token) => state.gate.resolve(token).await,
      None => None,
    };
    Ok(Self(customer))
  }
}
