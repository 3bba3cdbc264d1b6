//! Patron server assembly: configuration, capability wiring, and the HTTP
//! application.

pub mod identity;
pub mod notify;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use patron_api::ApiState;
use patron_core::{
  config::{ContactConfig, ContactOptions, ReviewConfig},
  engine::{ContactEngine, ReviewEngine, WishlistService},
  notify::NotificationSender,
};
use patron_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use identity::StoreIdentityGate;
use notify::LogNotifier;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PATRON_*` environment variables.
///
/// The `contact` stanza accepts the canonical shape or either legacy
/// serialization; see [`ContactOptions`].
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub contact:    ContactOptions,
  #[serde(default)]
  pub reviews:    ReviewConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 9000 }
fn default_store_path() -> PathBuf { PathBuf::from("patron.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
      contact:    ContactOptions::default(),
      reviews:    ReviewConfig::default(),
    }
  }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the HTTP application: engines over the given store, the
/// store-backed identity gate, the logging notifier, and request tracing.
pub fn app(
  store: Arc<SqliteStore>,
  contact: ContactConfig,
  reviews: ReviewConfig,
) -> Router {
  let notifier: Arc<dyn NotificationSender> = Arc::new(LogNotifier);
  let state = ApiState {
    contact:  Arc::new(ContactEngine::new(
      contact,
      Arc::clone(&store),
      Arc::clone(&notifier),
    )),
    reviews:  Arc::new(ReviewEngine::new(
      reviews,
      Arc::clone(&store),
      notifier,
    )),
    wishlist: Arc::new(WishlistService::new(Arc::clone(&store))),
    gate:     Arc::new(StoreIdentityGate::new(store)),
  };

  Router::new()
    .nest("/store", patron_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
