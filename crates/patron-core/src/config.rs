//! Engine configuration: the contact field schema, the status machine, and
//! notification rules.
//!
//! The engines accept a single canonical shape ([`ContactConfig`]) injected
//! at construction. Two legacy serializations of the same abstract config
//! exist in the wild — a flat transition list with `send_email` flags, and a
//! structured `statuses` + `status_options` form — and both convert into the
//! canonical shape via [`ContactOptions`]. Nothing in this module reads the
//! environment; base URLs and file paths are the server binary's concern.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error;

// ─── Field schema ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectChoice {
  pub value: String,
  pub label: String,
}

/// The kind of a payload field, with per-kind validation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
  Text,
  Textarea,
  Number,
  Select { options: Vec<SelectChoice> },
  MultiSelect { options: Vec<SelectChoice> },
  /// The legacy flat shape spells this `checkbox`.
  #[serde(alias = "checkbox")]
  Boolean,
  Date,
}

/// One configured payload field. Unknown keys in the serialized form
/// (`placeholder`, `helper_text`, …) are presentation-only and ignored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
  pub key:        String,
  pub label:      String,
  #[serde(flatten)]
  pub kind:       FieldKind,
  #[serde(default)]
  pub required:   bool,
  /// Minimum length for provided text values, after trimming.
  #[serde(default)]
  pub min_length: Option<u32>,
}

// ─── Status machine ──────────────────────────────────────────────────────────

/// The configured status set and transition table.
///
/// Statuses are free-form strings owned by the configuration; the machine
/// never invents or clamps one. No self-loops unless explicitly listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMachine {
  pub initial:      String,
  #[serde(rename = "final")]
  pub final_status: String,
  pub all:          Vec<String>,
  /// `from` → allowed `to` list.
  pub transitions:  BTreeMap<String, Vec<String>>,
}

impl StatusMachine {
  pub fn contains(&self, status: &str) -> bool {
    self.all.iter().any(|s| s == status)
  }

  pub fn is_final(&self, status: &str) -> bool {
    self.final_status == status
  }

  /// True iff `(from, to)` is an edge of the configured table.
  pub fn can_transition(&self, from: &str, to: &str) -> bool {
    self
      .transitions
      .get(from)
      .is_some_and(|targets| targets.iter().any(|t| t == to))
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.all.is_empty() {
      return Err(ConfigError::EmptyStatusSet);
    }
    for status in [&self.initial, &self.final_status] {
      if !self.contains(status) {
        return Err(ConfigError::UnknownStatus(status.clone()));
      }
    }
    for (from, targets) in &self.transitions {
      if !self.contains(from) {
        return Err(ConfigError::UnknownStatus(from.clone()));
      }
      for to in targets {
        if !self.contains(to) {
          return Err(ConfigError::UnknownStatus(to.clone()));
        }
      }
    }
    Ok(())
  }
}

// ─── Per-status notification options ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
  pub code:            String,
  pub label:           String,
  #[serde(default)]
  pub description:     Option<String>,
  #[serde(default)]
  pub notify_customer: bool,
  /// Dispatcher template for this status; falls back to the default.
  #[serde(default)]
  pub template:        Option<String>,
  /// Message subject for this status; falls back to the default.
  #[serde(default)]
  pub subject:         Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRules {
  #[serde(default = "default_true")]
  pub enabled:                  bool,
  #[serde(default)]
  pub send_on_create:           bool,
  #[serde(default)]
  pub acknowledgement_template: Option<String>,
  #[serde(default)]
  pub send_on_final_status:     bool,
  #[serde(default)]
  pub default_subject:          Option<String>,
  #[serde(default)]
  pub from_address:             Option<String>,
  #[serde(default)]
  pub reply_to:                 Option<String>,
}

fn default_true() -> bool { true }

impl Default for NotificationRules {
  fn default() -> Self {
    Self {
      enabled:                  true,
      send_on_create:           false,
      acknowledgement_template: None,
      send_on_final_status:     false,
      default_subject:          None,
      from_address:             None,
      reply_to:                 None,
    }
  }
}

// ─── Canonical contact configuration ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
  #[serde(default)]
  pub fields:                Vec<FieldDef>,
  pub statuses:              StatusMachine,
  #[serde(default)]
  pub status_options:        Vec<StatusOption>,
  #[serde(default)]
  pub notifications:         NotificationRules,
  /// When set, moving into the final status requires a non-empty note
  /// (close reasons are free text).
  #[serde(default)]
  pub require_note_on_final: bool,
  /// Upper bound on the serialized payload, in kilobytes.
  #[serde(default)]
  pub max_payload_kb:        Option<u32>,
}

impl ContactConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.statuses.validate()?;
    for option in &self.status_options {
      if !self.statuses.contains(&option.code) {
        return Err(ConfigError::UnknownStatus(option.code.clone()));
      }
    }
    let mut seen = std::collections::BTreeSet::new();
    for field in &self.fields {
      if !seen.insert(field.key.as_str()) {
        return Err(ConfigError::DuplicateField(field.key.clone()));
      }
    }
    Ok(())
  }

  pub fn status_option(&self, code: &str) -> Option<&StatusOption> {
    self.status_options.iter().find(|o| o.code == code)
  }

  /// Validate and sanitize a submitted payload against the field schema.
  ///
  /// Unknown keys are dropped silently. Optional fields are stored only when
  /// the caller provided a non-default value: a non-empty trimmed string, a
  /// `true` boolean, any number, a valid date, or a non-empty selection.
  /// Required fields are always stored with the provided value (a required
  /// boolean keeps an explicit `false`), and are an error when absent.
  pub fn validate_payload(
    &self,
    raw: &BTreeMap<String, serde_json::Value>,
  ) -> Result<BTreeMap<String, serde_json::Value>, Error> {
    if let Some(kb) = self.max_payload_kb {
      let size = serde_json::to_string(raw).map(|s| s.len()).unwrap_or(usize::MAX);
      if size > kb as usize * 1024 {
        return Err(Error::InvalidInput(format!(
          "payload exceeds the configured limit of {kb} KiB"
        )));
      }
    }

    let mut clean = BTreeMap::new();
    for field in &self.fields {
      match normalize_field(field, raw.get(&field.key))? {
        Some(value) => {
          clean.insert(field.key.clone(), value);
        }
        None if field.required => {
          return Err(Error::InvalidInput(format!(
            "missing required field: {}",
            field.key
          )));
        }
        None => {}
      }
    }
    Ok(clean)
  }
}

/// Resolve one submitted value against its field definition.
/// `Ok(None)` means "treat as not provided".
fn normalize_field(
  field: &FieldDef,
  value: Option<&serde_json::Value>,
) -> Result<Option<serde_json::Value>, Error> {
  use serde_json::Value;

  let Some(value) = value else { return Ok(None) };
  if value.is_null() {
    return Ok(None);
  }

  let type_error = || {
    Error::InvalidInput(format!("invalid value for field: {}", field.key))
  };

  match &field.kind {
    FieldKind::Text | FieldKind::Textarea => {
      let s = value.as_str().ok_or_else(type_error)?.trim();
      if s.is_empty() {
        return Ok(None);
      }
      if let Some(min) = field.min_length
        && s.chars().count() < min as usize
      {
        return Err(Error::InvalidInput(format!(
          "field {} must be at least {min} characters",
          field.key
        )));
      }
      Ok(Some(Value::String(s.to_owned())))
    }

    FieldKind::Number => match value {
      Value::Number(n) => Ok(Some(Value::Number(n.clone()))),
      Value::String(s) => {
        let s = s.trim();
        if s.is_empty() {
          return Ok(None);
        }
        if let Ok(i) = s.parse::<i64>() {
          return Ok(Some(Value::from(i)));
        }
        let f = s.parse::<f64>().map_err(|_| type_error())?;
        serde_json::Number::from_f64(f)
          .map(|n| Some(Value::Number(n)))
          .ok_or_else(type_error)
      }
      _ => Err(type_error()),
    },

    FieldKind::Select { options } => {
      let s = value.as_str().ok_or_else(type_error)?.trim();
      if s.is_empty() {
        return Ok(None);
      }
      if !options.iter().any(|o| o.value == s) {
        return Err(type_error());
      }
      Ok(Some(Value::String(s.to_owned())))
    }

    FieldKind::MultiSelect { options } => {
      let selected: Vec<&str> = match value {
        Value::String(s) if s.trim().is_empty() => vec![],
        Value::String(s) => vec![s.trim()],
        Value::Array(items) => items
          .iter()
          .map(|v| v.as_str().map(str::trim).ok_or_else(type_error))
          .collect::<Result<_, _>>()?,
        _ => return Err(type_error()),
      };
      let selected: Vec<&str> =
        selected.into_iter().filter(|s| !s.is_empty()).collect();
      if selected.is_empty() {
        return Ok(None);
      }
      for s in &selected {
        if !options.iter().any(|o| o.value == *s) {
          return Err(type_error());
        }
      }
      Ok(Some(Value::Array(
        selected.into_iter().map(|s| Value::String(s.to_owned())).collect(),
      )))
    }

    FieldKind::Boolean => {
      let b = match value {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim() {
          "true" => true,
          "false" | "" => false,
          _ => return Err(type_error()),
        },
        _ => return Err(type_error()),
      };
      if field.required || b {
        Ok(Some(Value::Bool(b)))
      } else {
        Ok(None)
      }
    }

    FieldKind::Date => {
      let s = value.as_str().ok_or_else(type_error)?.trim();
      if s.is_empty() {
        return Ok(None);
      }
      NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| type_error())?;
      Ok(Some(Value::String(s.to_owned())))
    }
  }
}

// ─── Review configuration ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
  /// Notify the customer when a moderation decision lands on their review.
  #[serde(default)]
  pub notify_on_decision: bool,
  #[serde(default)]
  pub decision_template:  Option<String>,
}

// ─── Legacy shapes ───────────────────────────────────────────────────────────

/// The flat legacy serialization: `allowed_statuses` plus a transition list
/// with `send_email` flags. The `from: null` entry is the creation edge.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatContactOptions {
  pub default_status:     String,
  #[serde(default)]
  pub payload_fields:     Vec<FieldDef>,
  pub allowed_statuses:   Vec<String>,
  #[serde(default)]
  pub status_transitions: Vec<FlatTransition>,
  #[serde(default)]
  pub email:              FlatEmailRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlatTransition {
  /// `None` marks the creation edge. Formats without a null (TOML) omit the
  /// key instead.
  #[serde(default)]
  pub from:          Option<String>,
  pub to:            String,
  #[serde(default)]
  pub send_email:    bool,
  #[serde(default)]
  pub email_subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlatEmailRules {
  #[serde(default)]
  pub enabled:          bool,
  #[serde(default)]
  pub default_subject:  Option<String>,
  #[serde(default)]
  pub default_template: Option<String>,
}

impl FlatContactOptions {
  pub fn into_config(self) -> Result<ContactConfig, ConfigError> {
    let mut transitions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut status_options = Vec::new();
    let mut send_on_create = false;

    for t in &self.status_transitions {
      match &t.from {
        // Creation edge: only contributes the on-create flag.
        None => send_on_create = t.send_email,
        Some(from) => {
          transitions.entry(from.clone()).or_default().push(t.to.clone());
          if t.send_email {
            status_options.push(StatusOption {
              code:            t.to.clone(),
              label:           t.to.replace('_', " "),
              description:     None,
              notify_customer: true,
              template:        self.email.default_template.clone(),
              subject:         t.email_subject.clone(),
            });
          }
        }
      }
    }

    // The terminal status is the unique one with no outgoing edges.
    let finals: Vec<String> = self
      .allowed_statuses
      .iter()
      .filter(|s| !transitions.contains_key(*s))
      .cloned()
      .collect();
    let final_status = match finals.as_slice() {
      [only] => only.clone(),
      _ => return Err(ConfigError::AmbiguousFinal(finals)),
    };

    let config = ContactConfig {
      fields: self.payload_fields,
      statuses: StatusMachine {
        initial: self.default_status,
        final_status,
        all: self.allowed_statuses,
        transitions,
      },
      status_options,
      notifications: NotificationRules {
        enabled: self.email.enabled,
        send_on_create,
        acknowledgement_template: self.email.default_template,
        send_on_final_status: false,
        default_subject: self.email.default_subject,
        from_address: None,
        reply_to: None,
      },
      require_note_on_final: false,
      max_payload_kb: None,
    };
    config.validate()?;
    Ok(config)
  }
}

/// The structured legacy serialization: `statuses { initial, intermediates,
/// final, transitions }` plus a `status_options` table.
#[derive(Debug, Clone, Deserialize)]
pub struct StructuredContactOptions {
  #[serde(default)]
  pub form:           StructuredForm,
  pub statuses:       StructuredStatuses,
  #[serde(default)]
  pub status_options: Vec<StatusOption>,
  #[serde(default)]
  pub notifications:  NotificationRules,
  #[serde(default)]
  pub comments:       CommentRules,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredForm {
  #[serde(default)]
  pub max_payload_kb:    Option<u32>,
  #[serde(default)]
  pub additional_fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructuredStatuses {
  pub initial:       String,
  #[serde(default)]
  pub intermediates: Vec<String>,
  #[serde(rename = "final")]
  pub final_status:  String,
  #[serde(default)]
  pub transitions:   BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRules {
  #[serde(default)]
  pub enabled:               bool,
  #[serde(default)]
  pub require_note_on_final: bool,
}

impl StructuredContactOptions {
  pub fn into_config(self) -> Result<ContactConfig, ConfigError> {
    let mut all = vec![self.statuses.initial.clone()];
    for s in &self.statuses.intermediates {
      if !all.contains(s) {
        all.push(s.clone());
      }
    }
    if !all.contains(&self.statuses.final_status) {
      all.push(self.statuses.final_status.clone());
    }

    // Without an explicit table, the statuses form a linear chain.
    let transitions = if self.statuses.transitions.is_empty() {
      all
        .windows(2)
        .map(|pair| (pair[0].clone(), vec![pair[1].clone()]))
        .collect()
    } else {
      self.statuses.transitions
    };

    let config = ContactConfig {
      fields: self.form.additional_fields,
      statuses: StatusMachine {
        initial: self.statuses.initial,
        final_status: self.statuses.final_status,
        all,
        transitions,
      },
      status_options: self.status_options,
      notifications: self.notifications,
      require_note_on_final: self.comments.require_note_on_final,
      max_payload_kb: self.form.max_payload_kb,
    };
    config.validate()?;
    Ok(config)
  }
}

/// Any of the accepted serializations of the contact configuration.
///
/// Canonical is tried first; the structured shape is distinguished by its
/// `statuses.intermediates`/missing `all`, and the flat shape by having no
/// `statuses` stanza at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContactOptions {
  Canonical(ContactConfig),
  Structured(StructuredContactOptions),
  Flat(FlatContactOptions),
}

impl ContactOptions {
  pub fn into_config(self) -> Result<ContactConfig, ConfigError> {
    match self {
      Self::Canonical(config) => {
        config.validate()?;
        Ok(config)
      }
      Self::Structured(options) => options.into_config(),
      Self::Flat(options) => options.into_config(),
    }
  }
}

impl Default for ContactOptions {
  fn default() -> Self { Self::Canonical(ContactConfig::default()) }
}

/// The storefront's stock configuration: pending → in_progress → resolved →
/// closed, subject/message required, the usual optional fields.
impl Default for ContactConfig {
  fn default() -> Self {
    let select = |values: &[&str]| {
      values
        .iter()
        .map(|v| SelectChoice {
          value: (*v).to_owned(),
          label: v.replace('_', " "),
        })
        .collect::<Vec<_>>()
    };
    let field = |key: &str, label: &str, kind: FieldKind, required: bool| FieldDef {
      key: key.to_owned(),
      label: label.to_owned(),
      kind,
      required,
      min_length: None,
    };

    Self {
      fields: vec![
        field("subject", "Subject", FieldKind::Text, true),
        field("message", "Message", FieldKind::Textarea, true),
        field(
          "priority",
          "Priority",
          FieldKind::Select { options: select(&["low", "medium", "high", "urgent"]) },
          false,
        ),
        field("order_number", "Order Number", FieldKind::Text, false),
        field("phone", "Phone Number", FieldKind::Text, false),
        field(
          "preferred_contact_method",
          "Preferred Contact Method",
          FieldKind::Select { options: select(&["email", "phone"]) },
          false,
        ),
        field(
          "is_return_request",
          "Is this a return request?",
          FieldKind::Boolean,
          false,
        ),
      ],
      statuses: StatusMachine {
        initial: "pending".to_owned(),
        final_status: "closed".to_owned(),
        all: ["pending", "in_progress", "resolved", "closed"]
          .map(str::to_owned)
          .to_vec(),
        transitions: BTreeMap::from([
          ("pending".to_owned(), vec!["in_progress".to_owned()]),
          ("in_progress".to_owned(), vec!["resolved".to_owned()]),
          ("resolved".to_owned(), vec!["closed".to_owned()]),
        ]),
      },
      status_options: vec![
        StatusOption {
          code:            "in_progress".to_owned(),
          label:           "in progress".to_owned(),
          description:     None,
          notify_customer: true,
          template:        None,
          subject:         Some("Your request is being processed".to_owned()),
        },
        StatusOption {
          code:            "resolved".to_owned(),
          label:           "resolved".to_owned(),
          description:     None,
          notify_customer: true,
          template:        None,
          subject:         Some("Your request has been resolved".to_owned()),
        },
      ],
      notifications: NotificationRules {
        default_subject: Some("Contact Request Status Update".to_owned()),
        ..NotificationRules::default()
      },
      require_note_on_final: false,
      max_payload_kb: None,
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("status {0:?} is not in the configured status set")]
  UnknownStatus(String),

  #[error("no unambiguous terminal status; candidates: {0:?}")]
  AmbiguousFinal(Vec<String>),

  #[error("the status set is empty")]
  EmptyStatusSet,

  #[error("duplicate field key: {0:?}")]
  DuplicateField(String),
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn flat_sample() -> serde_json::Value {
    json!({
      "default_status": "pending",
      "payload_fields": [
        { "key": "subject", "type": "text", "required": true, "label": "Subject" },
        { "key": "message", "type": "textarea", "required": true, "label": "Message" },
        { "key": "is_return_request", "type": "checkbox", "required": false,
          "label": "Is this a return request?" }
      ],
      "allowed_statuses": ["pending", "in_progress", "resolved", "closed"],
      "status_transitions": [
        { "from": null, "to": "pending", "send_email": false },
        { "from": "pending", "to": "in_progress", "send_email": true,
          "email_subject": "Your request is being processed" },
        { "from": "in_progress", "to": "resolved", "send_email": true,
          "email_subject": "Your request has been resolved" },
        { "from": "resolved", "to": "closed", "send_email": false }
      ],
      "email": {
        "enabled": true,
        "default_subject": "Contact Request Status Update"
      }
    })
  }

  fn structured_sample() -> serde_json::Value {
    json!({
      "form": {
        "max_payload_kb": 64,
        "additional_fields": [
          { "key": "subject", "type": "text", "required": true, "label": "Subject" },
          { "key": "follow_up_date", "type": "date", "required": false,
            "label": "Follow-up date" }
        ]
      },
      "statuses": {
        "initial": "new",
        "intermediates": ["triaged", "answered"],
        "final": "closed",
        "transitions": {
          "new": ["triaged"],
          "triaged": ["answered", "closed"],
          "answered": ["closed"]
        }
      },
      "status_options": [
        { "code": "answered", "label": "Answered", "notify_customer": true,
          "template": "contact-answered" }
      ],
      "notifications": {
        "send_on_create": true,
        "acknowledgement_template": "contact-ack",
        "send_on_final_status": true
      },
      "comments": { "enabled": true, "require_note_on_final": true }
    })
  }

  #[test]
  fn flat_shape_converts_to_canonical() {
    let options: ContactOptions = serde_json::from_value(flat_sample()).unwrap();
    assert!(matches!(options, ContactOptions::Flat(_)));

    let config = options.into_config().unwrap();
    assert_eq!(config.statuses.initial, "pending");
    assert_eq!(config.statuses.final_status, "closed");
    assert!(config.statuses.can_transition("pending", "in_progress"));
    assert!(config.statuses.can_transition("resolved", "closed"));
    assert!(!config.statuses.can_transition("pending", "closed"));
    assert!(!config.notifications.send_on_create);

    let in_progress = config.status_option("in_progress").unwrap();
    assert!(in_progress.notify_customer);
    assert_eq!(
      in_progress.subject.as_deref(),
      Some("Your request is being processed")
    );
    // The creation and close edges carry no notification.
    assert!(config.status_option("closed").is_none());
  }

  #[test]
  fn flat_checkbox_maps_to_boolean() {
    let options: ContactOptions = serde_json::from_value(flat_sample()).unwrap();
    let config = options.into_config().unwrap();
    let field = config.fields.iter().find(|f| f.key == "is_return_request").unwrap();
    assert_eq!(field.kind, FieldKind::Boolean);
  }

  #[test]
  fn structured_shape_converts_to_canonical() {
    let options: ContactOptions =
      serde_json::from_value(structured_sample()).unwrap();
    assert!(matches!(options, ContactOptions::Structured(_)));

    let config = options.into_config().unwrap();
    assert_eq!(config.statuses.initial, "new");
    assert_eq!(config.statuses.final_status, "closed");
    assert!(config.statuses.can_transition("triaged", "closed"));
    assert!(config.notifications.send_on_create);
    assert!(config.notifications.send_on_final_status);
    assert!(config.require_note_on_final);
    assert_eq!(config.max_payload_kb, Some(64));
  }

  #[test]
  fn structured_without_transitions_forms_a_chain() {
    let options: StructuredContactOptions = serde_json::from_value(json!({
      "statuses": { "initial": "new", "intermediates": ["open"], "final": "done" }
    }))
    .unwrap();
    let config = options.into_config().unwrap();
    assert!(config.statuses.can_transition("new", "open"));
    assert!(config.statuses.can_transition("open", "done"));
    assert!(!config.statuses.can_transition("new", "done"));
  }

  #[test]
  fn canonical_shape_is_accepted_directly() {
    let config = ContactConfig::default();
    let round_tripped: ContactOptions =
      serde_json::from_value(serde_json::to_value(&config).unwrap()).unwrap();
    assert!(matches!(round_tripped, ContactOptions::Canonical(_)));
    let config = round_tripped.into_config().unwrap();
    assert!(config.statuses.can_transition("pending", "in_progress"));
  }

  #[test]
  fn transition_to_unknown_status_is_rejected() {
    let mut config = ContactConfig::default();
    config
      .statuses
      .transitions
      .insert("closed".to_owned(), vec!["reopened".to_owned()]);
    assert!(matches!(
      config.validate(),
      Err(ConfigError::UnknownStatus(s)) if s == "reopened"
    ));
  }

  #[test]
  fn flat_without_unique_terminal_is_rejected() {
    let options: FlatContactOptions = serde_json::from_value(json!({
      "default_status": "a",
      "allowed_statuses": ["a", "b", "c"],
      "status_transitions": [{ "from": "a", "to": "b" }]
    }))
    .unwrap();
    assert!(matches!(
      options.into_config(),
      Err(ConfigError::AmbiguousFinal(_))
    ));
  }

  // ── Payload validation ────────────────────────────────────────────────────

  fn payload(value: serde_json::Value) -> BTreeMap<String, serde_json::Value> {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn missing_required_field_is_named() {
    let config = ContactConfig::default();
    let err = config
      .validate_payload(&payload(json!({ "subject": "Order issue" })))
      .unwrap_err();
    assert!(err.to_string().contains("message"), "{err}");
  }

  #[test]
  fn unknown_keys_are_dropped_silently() {
    let config = ContactConfig::default();
    let clean = config
      .validate_payload(&payload(json!({
        "subject": "Order issue",
        "message": "My order arrived damaged",
        "tracking_pixel": "beacon"
      })))
      .unwrap();
    assert!(!clean.contains_key("tracking_pixel"));
    assert_eq!(clean["subject"], "Order issue");
  }

  #[test]
  fn optional_defaults_are_not_stored() {
    let config = ContactConfig::default();
    let clean = config
      .validate_payload(&payload(json!({
        "subject": "Hi",
        "message": "Hello",
        "phone": "   ",
        "is_return_request": false
      })))
      .unwrap();
    assert!(!clean.contains_key("phone"));
    assert!(!clean.contains_key("is_return_request"));
  }

  #[test]
  fn true_boolean_and_string_forms_are_stored() {
    let config = ContactConfig::default();
    let clean = config
      .validate_payload(&payload(json!({
        "subject": "Hi",
        "message": "Hello",
        "is_return_request": "true"
      })))
      .unwrap();
    assert_eq!(clean["is_return_request"], json!(true));
  }

  #[test]
  fn required_boolean_keeps_explicit_false() {
    let config = ContactConfig {
      fields: vec![FieldDef {
        key:        "consent".to_owned(),
        label:      "Consent".to_owned(),
        kind:       FieldKind::Boolean,
        required:   true,
        min_length: None,
      }],
      ..ContactConfig::default()
    };
    let clean = config
      .validate_payload(&payload(json!({ "consent": false })))
      .unwrap();
    assert_eq!(clean["consent"], json!(false));

    let err = config.validate_payload(&payload(json!({}))).unwrap_err();
    assert!(err.to_string().contains("consent"));
  }

  #[test]
  fn select_value_must_be_a_configured_option() {
    let config = ContactConfig::default();
    let err = config
      .validate_payload(&payload(json!({
        "subject": "Hi",
        "message": "Hello",
        "priority": "catastrophic"
      })))
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }

  #[test]
  fn numeric_strings_are_parsed() {
    let config = ContactConfig {
      fields: vec![FieldDef {
        key:        "quantity".to_owned(),
        label:      "Quantity".to_owned(),
        kind:       FieldKind::Number,
        required:   false,
        min_length: None,
      }],
      ..ContactConfig::default()
    };
    let clean = config
      .validate_payload(&payload(json!({ "quantity": "3" })))
      .unwrap();
    assert_eq!(clean["quantity"], json!(3));
  }

  #[test]
  fn min_length_applies_to_provided_text() {
    let mut config = ContactConfig::default();
    config
      .fields
      .iter_mut()
      .find(|f| f.key == "message")
      .unwrap()
      .min_length = Some(10);

    let err = config
      .validate_payload(&payload(json!({ "subject": "Hi", "message": "short" })))
      .unwrap_err();
    assert!(err.to_string().contains("message"), "{err}");

    assert!(config
      .validate_payload(&payload(json!({
        "subject": "Hi",
        "message": "long enough now"
      })))
      .is_ok());
  }

  #[test]
  fn invalid_date_is_rejected() {
    let config = ContactConfig {
      fields: vec![FieldDef {
        key:        "follow_up".to_owned(),
        label:      "Follow-up".to_owned(),
        kind:       FieldKind::Date,
        required:   false,
        min_length: None,
      }],
      ..ContactConfig::default()
    };
    assert!(config
      .validate_payload(&payload(json!({ "follow_up": "2026-02-30" })))
      .is_err());
    assert!(config
      .validate_payload(&payload(json!({ "follow_up": "2026-02-27" })))
      .is_ok());
  }

  #[test]
  fn payload_size_limit_is_enforced() {
    let config = ContactConfig {
      max_payload_kb: Some(1),
      ..ContactConfig::default()
    };
    let big = "x".repeat(2048);
    let err = config
      .validate_payload(&payload(json!({
        "subject": "Hi",
        "message": big
      })))
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }
}
