//! Core types, configuration, and engines for the Patron customer-engagement
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! engines talk to the outside world through three injected capabilities:
//! [`store::EngagementStore`] (persistence), [`identity::IdentityGate`]
//! (bearer-credential resolution), and [`notify::NotificationSender`]
//! (templated message delivery). All other crates depend on this one.

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod notify;
pub mod review;
pub mod store;
pub mod ticket;

pub use error::{Error, Result};
