//! Customer identity — the opaque credential resolved per call.
//!
//! Sessions, cookies, and token issuance all live outside this service. The
//! only thing the engines ever see is the *result* of resolving a bearer
//! token: an optional [`CustomerId`], passed explicitly into every
//! authenticated operation. There is no ambient session state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The commerce platform's identifier for an authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CustomerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for CustomerId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// Resolves an opaque bearer token to a customer, if any.
///
/// Resolution failures (expired token, unreachable backend) degrade to
/// `None`: the caller is simply not authenticated. Write paths that require
/// a customer turn that `None` into [`Error::Unauthorized`](crate::Error).
#[async_trait::async_trait]
pub trait IdentityGate: Send + Sync {
  async fn resolve(&self, bearer: &str) -> Option<CustomerId>;
}
