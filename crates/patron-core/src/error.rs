//! The error taxonomy shared by every engine.
//!
//! Validation errors are raised before any side effect, so a caller that
//! receives [`Error::InvalidInput`] can assume nothing was written.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing required data; recoverable by correcting the input.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Missing or unresolvable credential; recoverable by re-authenticating.
  #[error("not authenticated")]
  Unauthorized,

  /// The requested status change is not an edge of the configured machine.
  #[error("invalid transition from {from:?} to {to:?}")]
  InvalidTransition { from: String, to: String },

  /// A concurrent update won the race; the caller may re-read and retry.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Referenced ticket, product, or review does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// Store or network failure; transient, eligible for caller-level retry.
  #[error("upstream failure: {0}")]
  Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error as an upstream failure.
  pub fn upstream<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Upstream(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
