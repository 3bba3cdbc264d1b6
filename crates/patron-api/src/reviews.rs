//! Handlers for `/reviews` and `/products/:id` review endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/reviews` | Bearer required; body: [`SubmitBody`] |
//! | `POST` | `/reviews/:id/status` | Moderation decision |
//! | `GET`  | `/products/:product_id/reviews` | Approved reviews only |
//! | `GET`  | `/products/:product_id/rating` | Derived rating summary |
//! | `GET`  | `/products/:product_id/reviews/mine` | Own reviews, lenient |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use patron_core::{review::ReviewStatus, store::EngagementStore};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, extract::Identity};

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reviews`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub product_id:  String,
  /// Integer 1–5; non-integers are rejected at deserialization.
  pub rating:      i32,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: String,
}

/// `POST /reviews` — 401 for anonymous callers, 201 + the pending review
/// otherwise.
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  Identity(customer): Identity,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let review = state
    .reviews
    .submit(
      customer.as_ref(),
      &body.product_id,
      body.rating,
      &body.title,
      &body.description,
    )
    .await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "status": "success",
      "message": "Thanks! Your review is awaiting approval.",
      "review": review,
    })),
  ))
}

// ─── Moderate ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reviews/:id/status`.
#[derive(Debug, Deserialize)]
pub struct ModerateBody {
  pub status: ReviewStatus,
}

/// `POST /reviews/:id/status` — apply a moderation decision.
pub async fn moderate<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ModerateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let review = state.reviews.moderate(id, body.status).await?;
  Ok(Json(json!({
    "status": "success",
    "message": "Review updated.",
    "review": review,
  })))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /products/:product_id/reviews`
pub async fn product_reviews<S>(
  State(state): State<ApiState<S>>,
  Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let reviews = state.reviews.product_reviews(&product_id).await?;
  Ok(Json(json!({ "reviews": reviews })))
}

/// `GET /products/:product_id/rating`
pub async fn product_rating<S>(
  State(state): State<ApiState<S>>,
  Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let summary = state.reviews.rating_summary(&product_id).await?;
  Ok(Json(json!({ "rating": summary })))
}

/// `GET /products/:product_id/reviews/mine` — the caller's own reviews for
/// the product, any status. Anonymous callers get an empty list, not an
/// error.
pub async fn customer_reviews<S>(
  State(state): State<ApiState<S>>,
  Identity(customer): Identity,
  Path(product_id): Path<String>,
) -> impl IntoResponse
where
  S: EngagementStore,
{
  let reviews = state
    .reviews
    .customer_reviews(customer.as_ref(), &product_id)
    .await;
  Json(json!({ "reviews": reviews }))
}
