//! Handlers for `/contact` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contact/requests` | Body: [`SubmitBody`]; 201 + stored ticket |
//! | `GET`  | `/contact/requests/:id` | Ticket with full status history |
//! | `POST` | `/contact/requests/:id/status` | Body: [`TransitionBody`] |
//! | `POST` | `/contact/subscriptions` | Body: [`SubscribeBody`]; upsert |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use patron_core::{store::EngagementStore, ticket::ContactTicket};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contact/requests`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub email:   String,
  #[serde(default)]
  pub payload: BTreeMap<String, serde_json::Value>,
  pub source:  Option<String>,
}

/// `POST /contact/requests` — returns 201 + the stored ticket.
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let source = body.source.as_deref().unwrap_or("contact_page");
  let ticket = state.contact.submit(&body.email, &body.payload, source).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "status": "success",
      "message": "Thanks! We received your message.",
      "ticket": ticket,
    })),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contact/requests/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ContactTicket>, ApiError>
where
  S: EngagementStore,
{
  Ok(Json(state.contact.get(id).await?))
}

// ─── Transition ───────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contact/requests/:id/status`.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
  pub to_status: String,
  pub note:      Option<String>,
}

/// `POST /contact/requests/:id/status`
pub async fn transition<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TransitionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let ticket = state
    .contact
    .transition(id, &body.to_status, body.note.as_deref())
    .await?;
  Ok(Json(json!({
    "status": "success",
    "message": "Status updated.",
    "ticket": ticket,
  })))
}

// ─── Subscribe ────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contact/subscriptions`.
#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
  pub email:  String,
  pub source: Option<String>,
}

/// `POST /contact/subscriptions` — upsert keyed by the normalized email.
pub async fn subscribe<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<SubscribeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let source = body.source.as_deref().unwrap_or("footer_form");
  let subscription = state.contact.upsert_subscription(&body.email, source).await?;
  Ok(Json(json!({
    "status": "success",
    "message": "You're subscribed!",
    "subscription": subscription,
  })))
}
