//! Handlers for `/wishlist` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/wishlist` | Bearer required; the full membership set |
//! | `POST`   | `/wishlist` | Body: `{"product_id": …}`; idempotent |
//! | `DELETE` | `/wishlist/:product_id` | Removing a non-member succeeds |
//! | `GET`    | `/wishlist/check?product_id=…` | Anonymous → `false`, 200 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use patron_core::{engine::WishlistOutcome, store::EngagementStore};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiState, error::ApiError, extract::Identity};

/// The structured "not authenticated" reply: anonymous wishlist mutation is
/// a normal case, answered without raising anything.
fn sign_in_required() -> Response {
  (
    StatusCode::UNAUTHORIZED,
    Json(json!({
      "status": "error",
      "message": "Please sign in to use your wishlist.",
    })),
  )
    .into_response()
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub product_id: String,
}

/// `POST /wishlist`
pub async fn add<S>(
  State(state): State<ApiState<S>>,
  Identity(customer): Identity,
  Json(body): Json<AddBody>,
) -> Result<Response, ApiError>
where
  S: EngagementStore,
{
  match state.wishlist.add(customer.as_ref(), &body.product_id).await? {
    WishlistOutcome::Granted(()) => {
      Ok(Json(json!({ "status": "success" })).into_response())
    }
    WishlistOutcome::NotAuthenticated => Ok(sign_in_required()),
  }
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /wishlist/:product_id`
pub async fn remove<S>(
  State(state): State<ApiState<S>>,
  Identity(customer): Identity,
  Path(product_id): Path<String>,
) -> Result<Response, ApiError>
where
  S: EngagementStore,
{
  match state.wishlist.remove(customer.as_ref(), &product_id).await? {
    WishlistOutcome::Granted(()) => {
      Ok(Json(json!({ "status": "success" })).into_response())
    }
    WishlistOutcome::NotAuthenticated => Ok(sign_in_required()),
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /wishlist`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Identity(customer): Identity,
) -> Result<Response, ApiError>
where
  S: EngagementStore,
{
  match state.wishlist.list(customer.as_ref()).await? {
    WishlistOutcome::Granted(products) => {
      Ok(Json(json!({ "wishlist": products })).into_response())
    }
    WishlistOutcome::NotAuthenticated => Ok(sign_in_required()),
  }
}

// ─── Check ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckParams {
  pub product_id: Option<String>,
}

/// `GET /wishlist/check?product_id=…`
///
/// Fail-closed membership probe: anonymous callers and lookup failures both
/// answer `false` with a 200, so product pages never block on this call.
pub async fn check<S>(
  State(state): State<ApiState<S>>,
  Identity(customer): Identity,
  Query(params): Query<CheckParams>,
) -> Response
where
  S: EngagementStore,
{
  let Some(product_id) = params.product_id.as_deref() else {
    return (
      StatusCode::BAD_REQUEST,
      Json(json!({
        "status": "error",
        "message": "product_id is required",
      })),
    )
      .into_response();
  };

  let in_wishlist = state.wishlist.contains(customer.as_ref(), product_id).await;
  Json(json!({ "in_wishlist": in_wishlist })).into_response()
}
