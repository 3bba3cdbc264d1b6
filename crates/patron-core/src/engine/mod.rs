//! The three engines behind the storefront's engagement endpoints.

pub mod contact;
pub mod review;
pub mod wishlist;

pub use contact::ContactEngine;
pub use review::ReviewEngine;
pub use wishlist::{WishlistOutcome, WishlistService};

use crate::notify::{Notification, NotificationSender};

/// Fire-and-forget dispatch: a sender failure is logged and never affects
/// the state change that triggered it.
pub(crate) async fn dispatch(
  notifier: &dyn NotificationSender,
  notification: Notification,
) {
  let template = notification.template.clone();
  if let Err(err) = notifier.send(notification).await {
    tracing::warn!(%template, error = %err, "notification dispatch failed");
  }
}
