//! The contact ticket engine: submission, the status machine, and the
//! subscription upsert.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::{
  Result,
  config::{ContactConfig, StatusOption},
  engine::dispatch,
  error::Error,
  notify::{Notification, NotificationSender},
  store::{EngagementStore, TransitionOutcome},
  ticket::{ContactTicket, StatusChange, Subscription, SubscriptionStatus},
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

pub(crate) fn is_valid_email(address: &str) -> bool {
  EMAIL_PATTERN.is_match(address)
}

pub struct ContactEngine<S> {
  config:   ContactConfig,
  store:    Arc<S>,
  notifier: Arc<dyn NotificationSender>,
}

impl<S: EngagementStore> ContactEngine<S> {
  pub fn new(
    config: ContactConfig,
    store: Arc<S>,
    notifier: Arc<dyn NotificationSender>,
  ) -> Self {
    Self { config, store, notifier }
  }

  pub fn config(&self) -> &ContactConfig { &self.config }

  /// Validate and persist a new contact request.
  ///
  /// All validation happens before any write: a malformed email or a payload
  /// that fails the field schema leaves no trace. On success the ticket is
  /// created in the configured initial status with a single history entry,
  /// and the acknowledgement notification fires if configured.
  pub async fn submit(
    &self,
    email: &str,
    payload: &BTreeMap<String, serde_json::Value>,
    source: &str,
  ) -> Result<ContactTicket> {
    let email = email.trim();
    if email.is_empty() || !is_valid_email(email) {
      return Err(Error::InvalidInput(
        "a valid email address is required".to_owned(),
      ));
    }
    let payload = self.config.validate_payload(payload)?;

    let now = Utc::now();
    let initial = self.config.statuses.initial.clone();
    let ticket = ContactTicket {
      ticket_id: Uuid::new_v4(),
      email: email.to_owned(),
      status: initial.clone(),
      payload,
      source: source.trim().to_owned(),
      created_at: now,
      updated_at: now,
      status_history: vec![StatusChange {
        from: None,
        to:   initial,
        at:   now,
        note: None,
      }],
    };

    self
      .store
      .insert_ticket(ticket.clone())
      .await
      .map_err(Error::upstream)?;

    let rules = &self.config.notifications;
    if rules.enabled && rules.send_on_create {
      dispatch(self.notifier.as_ref(), self.created_notification(&ticket)).await;
    }

    Ok(ticket)
  }

  pub async fn get(&self, ticket_id: Uuid) -> Result<ContactTicket> {
    self
      .store
      .get_ticket(ticket_id)
      .await
      .map_err(Error::upstream)?
      .ok_or_else(|| Error::NotFound(format!("ticket {ticket_id}")))
  }

  /// Move a ticket to `to_status` along a configured edge.
  ///
  /// The write is an optimistic compare-and-set on the status observed here;
  /// losing the race to a concurrent transition yields [`Error::Conflict`].
  pub async fn transition(
    &self,
    ticket_id: Uuid,
    to_status: &str,
    note: Option<&str>,
  ) -> Result<ContactTicket> {
    let machine = &self.config.statuses;
    let ticket = self.get(ticket_id).await?;

    if !machine.contains(to_status)
      || !machine.can_transition(&ticket.status, to_status)
    {
      return Err(Error::InvalidTransition {
        from: ticket.status,
        to:   to_status.to_owned(),
      });
    }

    let note = note
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .map(str::to_owned);
    if machine.is_final(to_status)
      && self.config.require_note_on_final
      && note.is_none()
    {
      return Err(Error::InvalidInput(
        "a close note is required for the final status".to_owned(),
      ));
    }

    let change = StatusChange {
      from: Some(ticket.status.clone()),
      to:   to_status.to_owned(),
      at:   Utc::now(),
      note: note.clone(),
    };

    let updated = match self
      .store
      .apply_transition(ticket_id, change)
      .await
      .map_err(Error::upstream)?
    {
      TransitionOutcome::Applied(updated) => updated,
      TransitionOutcome::StaleStatus { actual } => {
        return Err(Error::Conflict(format!(
          "ticket {ticket_id} was moved to {actual:?} concurrently"
        )));
      }
      TransitionOutcome::Missing => {
        return Err(Error::NotFound(format!("ticket {ticket_id}")));
      }
    };

    let rules = &self.config.notifications;
    if rules.enabled {
      if let Some(option) = self.config.status_option(to_status)
        && option.notify_customer
      {
        dispatch(
          self.notifier.as_ref(),
          self.status_notification(&updated, option, note.as_deref()),
        )
        .await;
      }
      if machine.is_final(to_status) && rules.send_on_final_status {
        dispatch(self.notifier.as_ref(), self.final_notification(&updated)).await;
      }
    }

    Ok(updated)
  }

  /// Insert or refresh the subscription keyed by the normalized email.
  pub async fn upsert_subscription(
    &self,
    email: &str,
    source: &str,
  ) -> Result<Subscription> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
      return Err(Error::InvalidInput("email is required".to_owned()));
    }
    if !is_valid_email(&email) {
      return Err(Error::InvalidInput(
        "a valid email address is required".to_owned(),
      ));
    }

    let source = source.trim().to_owned();
    let now = Utc::now();
    let subscription = Subscription {
      email,
      status: SubscriptionStatus::Subscribed,
      source: source.clone(),
      metadata: BTreeMap::from([(
        "source".to_owned(),
        serde_json::Value::String(source),
      )]),
      created_at: now,
      updated_at: now,
    };

    self
      .store
      .upsert_subscription(subscription)
      .await
      .map_err(Error::upstream)
  }

  // ── Notification builders ─────────────────────────────────────────────

  fn base_variables(&self, ticket: &ContactTicket) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::from([
      ("ticket_id".to_owned(), ticket.ticket_id.to_string()),
      ("status".to_owned(), ticket.status.clone()),
    ]);
    if let Some(from) = &self.config.notifications.from_address {
      variables.insert("from_address".to_owned(), from.clone());
    }
    if let Some(reply_to) = &self.config.notifications.reply_to {
      variables.insert("reply_to".to_owned(), reply_to.clone());
    }
    variables
  }

  fn created_notification(&self, ticket: &ContactTicket) -> Notification {
    let rules = &self.config.notifications;
    let mut variables = self.base_variables(ticket);
    if let Some(subject) = &rules.default_subject {
      variables.insert("subject".to_owned(), subject.clone());
    }
    Notification {
      template: rules
        .acknowledgement_template
        .clone()
        .unwrap_or_else(|| "contact-acknowledgement".to_owned()),
      recipient: ticket.email.clone(),
      variables,
    }
  }

  fn status_notification(
    &self,
    ticket: &ContactTicket,
    option: &StatusOption,
    note: Option<&str>,
  ) -> Notification {
    let rules = &self.config.notifications;
    let mut variables = self.base_variables(ticket);
    if let Some(subject) =
      option.subject.as_ref().or(rules.default_subject.as_ref())
    {
      variables.insert("subject".to_owned(), subject.clone());
    }
    if let Some(note) = note {
      variables.insert("note".to_owned(), note.to_owned());
    }
    Notification {
      template: option
        .template
        .clone()
        .unwrap_or_else(|| "contact-status-update".to_owned()),
      recipient: ticket.email.clone(),
      variables,
    }
  }

  fn final_notification(&self, ticket: &ContactTicket) -> Notification {
    let mut variables = self.base_variables(ticket);
    if let Some(subject) = &self.config.notifications.default_subject {
      variables.insert("subject".to_owned(), subject.clone());
    }
    Notification {
      template:  "contact-request-closed".to_owned(),
      recipient: ticket.email.clone(),
      variables,
    }
  }
}
