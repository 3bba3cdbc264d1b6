//! SQLite backend for the Patron engagement store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The single-connection model
//! also serializes the race-sensitive writes; the compare-and-set and
//! counter updates additionally run inside explicit transactions so the
//! invariants hold under any backend.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
