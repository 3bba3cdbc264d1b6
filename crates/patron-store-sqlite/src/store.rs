//! [`SqliteStore`] — the SQLite implementation of [`EngagementStore`].

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use patron_core::{
  identity::CustomerId,
  review::{RatingSummary, Review, ReviewStatus},
  store::{EngagementStore, ModerationOutcome, TransitionOutcome},
  ticket::{ContactTicket, StatusChange, Subscription},
};

use crate::{
  Error, Result,
  encode::{
    RawReview, RawStatusChange, RawSubscription, RawTicket, encode_dt,
    encode_json_map, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Patron engagement store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// funnels through one connection on a dedicated thread, which serializes
/// writes; the race-sensitive operations additionally use transactions so
/// their invariants do not depend on that accident of the backend.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of the in-transaction status compare-and-set, before the updated
/// ticket is re-read.
enum RawTransition {
  Applied,
  Stale(String),
  Missing,
}

/// Outcome of the in-transaction moderation write.
enum RawModeration {
  Applied { previous: String },
  Missing,
}

const REVIEW_COLUMNS: &str = "review_id, product_id, customer_id, rating, \
   title, description, status, verified_purchase, is_current, created_at";

fn read_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReview> {
  Ok(RawReview {
    review_id:         row.get(0)?,
    product_id:        row.get(1)?,
    customer_id:       row.get(2)?,
    rating:            row.get(3)?,
    title:             row.get(4)?,
    description:       row.get(5)?,
    status:            row.get(6)?,
    verified_purchase: row.get(7)?,
    is_current:        row.get(8)?,
    created_at:        row.get(9)?,
  })
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EngagementStore impl ────────────────────────────────────────────────────

impl EngagementStore for SqliteStore {
  type Error = Error;

  // ── Contact tickets ───────────────────────────────────────────────────────

  async fn insert_ticket(&self, ticket: ContactTicket) -> Result<()> {
    let ticket_id_str  = encode_uuid(ticket.ticket_id);
    let payload_str    = encode_json_map(&ticket.payload)?;
    let created_at_str = encode_dt(ticket.created_at);
    let updated_at_str = encode_dt(ticket.updated_at);
    let email          = ticket.email;
    let status         = ticket.status;
    let source         = ticket.source;
    let history: Vec<(Option<String>, String, Option<String>, String)> = ticket
      .status_history
      .into_iter()
      .map(|c| (c.from, c.to, c.note, encode_dt(c.at)))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO contact_tickets (
             ticket_id, email, status, payload, source, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            ticket_id_str,
            email,
            status,
            payload_str,
            source,
            created_at_str,
            updated_at_str,
          ],
        )?;
        for (from, to, note, at) in history {
          tx.execute(
            "INSERT INTO ticket_status_history
               (ticket_id, from_status, to_status, note, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![ticket_id_str, from, to, note, at],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<ContactTicket>> {
    let id_str = encode_uuid(ticket_id);

    let raw: Option<(RawTicket, Vec<RawStatusChange>)> = self
      .conn
      .call(move |conn| {
        let ticket: Option<RawTicket> = conn
          .query_row(
            "SELECT ticket_id, email, status, payload, source, created_at, updated_at
             FROM contact_tickets WHERE ticket_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawTicket {
                ticket_id:  row.get(0)?,
                email:      row.get(1)?,
                status:     row.get(2)?,
                payload:    row.get(3)?,
                source:     row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
              })
            },
          )
          .optional()?;

        let Some(ticket) = ticket else { return Ok(None) };

        let mut stmt = conn.prepare(
          "SELECT from_status, to_status, note, recorded_at
           FROM ticket_status_history WHERE ticket_id = ?1 ORDER BY seq ASC",
        )?;
        let history = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawStatusChange {
              from_status: row.get(0)?,
              to_status:   row.get(1)?,
              note:        row.get(2)?,
              recorded_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((ticket, history)))
      })
      .await?;

    raw
      .map(|(ticket, history)| ticket.into_ticket(history))
      .transpose()
  }

  async fn apply_transition(
    &self,
    ticket_id: Uuid,
    change: StatusChange,
  ) -> Result<TransitionOutcome> {
    let Some(expected) = change.from.clone() else {
      return Err(Error::Decode(
        "transition change is missing its from status".to_owned(),
      ));
    };
    let id_str = encode_uuid(ticket_id);
    let to     = change.to;
    let note   = change.note;
    let at_str = encode_dt(change.at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM contact_tickets WHERE ticket_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(current) = current else { return Ok(RawTransition::Missing) };
        if current != expected {
          return Ok(RawTransition::Stale(current));
        }

        tx.execute(
          "UPDATE contact_tickets SET status = ?2, updated_at = ?3
           WHERE ticket_id = ?1",
          rusqlite::params![id_str, to, at_str],
        )?;
        tx.execute(
          "INSERT INTO ticket_status_history
             (ticket_id, from_status, to_status, note, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, expected, to, note, at_str],
        )?;
        tx.commit()?;
        Ok(RawTransition::Applied)
      })
      .await?;

    match raw {
      RawTransition::Applied => match self.get_ticket(ticket_id).await? {
        Some(ticket) => Ok(TransitionOutcome::Applied(ticket)),
        None => Ok(TransitionOutcome::Missing),
      },
      RawTransition::Stale(actual) => Ok(TransitionOutcome::StaleStatus { actual }),
      RawTransition::Missing => Ok(TransitionOutcome::Missing),
    }
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn upsert_subscription(
    &self,
    subscription: Subscription,
  ) -> Result<Subscription> {
    let email        = subscription.email.clone();
    let status_str   = subscription.status.to_string();
    let source       = subscription.source;
    let metadata_str = encode_json_map(&subscription.metadata)?;
    let now_str      = encode_dt(subscription.updated_at);

    let raw: RawSubscription = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions
             (email, status, source, metadata, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT(email) DO UPDATE SET
             status = excluded.status,
             source = excluded.source,
             metadata = excluded.metadata,
             updated_at = excluded.updated_at",
          rusqlite::params![email, status_str, source, metadata_str, now_str],
        )?;
        let raw = conn.query_row(
          "SELECT email, status, source, metadata, created_at, updated_at
           FROM subscriptions WHERE email = ?1",
          rusqlite::params![email],
          |row| {
            Ok(RawSubscription {
              email:      row.get(0)?,
              status:     row.get(1)?,
              source:     row.get(2)?,
              metadata:   row.get(3)?,
              created_at: row.get(4)?,
              updated_at: row.get(5)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_subscription()
  }

  async fn get_subscription(&self, email: &str) -> Result<Option<Subscription>> {
    let email = email.to_owned();

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT email, status, source, metadata, created_at, updated_at
               FROM subscriptions WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawSubscription {
                  email:      row.get(0)?,
                  status:     row.get(1)?,
                  source:     row.get(2)?,
                  metadata:   row.get(3)?,
                  created_at: row.get(4)?,
                  updated_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn insert_review(&self, review: Review) -> Result<()> {
    let review_id_str  = encode_uuid(review.review_id);
    let product_id     = review.product_id;
    let customer_id    = review.customer_id.map(|c| c.0);
    let rating         = i64::from(review.rating);
    let title          = review.title;
    let description    = review.description;
    let status_str     = review.status.to_string();
    let verified       = review.verified_purchase;
    let is_current     = review.is_current;
    let created_at_str = encode_dt(review.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Retire the customer's previous current review for this product,
        // pulling it out of the aggregate if it was approved.
        if let Some(customer) = &customer_id {
          let previous: Option<(String, i64, String)> = tx
            .query_row(
              "SELECT review_id, rating, status FROM reviews
               WHERE customer_id = ?1 AND product_id = ?2 AND is_current = 1",
              rusqlite::params![customer, product_id],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

          if let Some((prev_id, prev_rating, prev_status)) = previous {
            tx.execute(
              "UPDATE reviews SET is_current = 0 WHERE review_id = ?1",
              rusqlite::params![prev_id],
            )?;
            if prev_status == "approved" {
              tx.execute(
                "UPDATE product_ratings SET
                   total_reviews = total_reviews - 1,
                   total_rating_sum = total_rating_sum - ?2
                 WHERE product_id = ?1",
                rusqlite::params![product_id, prev_rating],
              )?;
            }
          }
        }

        tx.execute(
          "INSERT INTO reviews (
             review_id, product_id, customer_id, rating, title, description,
             status, verified_purchase, is_current, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            review_id_str,
            product_id,
            customer_id,
            rating,
            title,
            description,
            status_str,
            verified,
            is_current,
            created_at_str,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>> {
    let id_str = encode_uuid(review_id);

    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = ?1"),
              rusqlite::params![id_str],
              read_review,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }

  async fn set_review_status(
    &self,
    review_id: Uuid,
    status: ReviewStatus,
  ) -> Result<ModerationOutcome> {
    let id_str     = encode_uuid(review_id);
    let status_str = status.to_string();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let row: Option<(String, i64, String, bool)> = tx
          .query_row(
            "SELECT product_id, rating, status, is_current FROM reviews
             WHERE review_id = ?1",
            rusqlite::params![id_str],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
          )
          .optional()?;

        let Some((product_id, rating, previous, is_current)) = row else {
          return Ok(RawModeration::Missing);
        };

        // Writing the status a review already has must stay counter-neutral.
        if previous != status_str {
          tx.execute(
            "UPDATE reviews SET status = ?2 WHERE review_id = ?1",
            rusqlite::params![id_str, status_str],
          )?;
          if is_current {
            if status_str == "approved" {
              tx.execute(
                "INSERT INTO product_ratings
                   (product_id, total_reviews, total_rating_sum)
                 VALUES (?1, 1, ?2)
                 ON CONFLICT(product_id) DO UPDATE SET
                   total_reviews = total_reviews + 1,
                   total_rating_sum = total_rating_sum + ?2",
                rusqlite::params![product_id, rating],
              )?;
            } else if previous == "approved" {
              tx.execute(
                "UPDATE product_ratings SET
                   total_reviews = total_reviews - 1,
                   total_rating_sum = total_rating_sum - ?2
                 WHERE product_id = ?1",
                rusqlite::params![product_id, rating],
              )?;
            }
          }
        }
        tx.commit()?;
        Ok(RawModeration::Applied { previous })
      })
      .await?;

    match raw {
      RawModeration::Applied { previous } => {
        let previous = crate::encode::decode_review_status(&previous)?;
        match self.get_review(review_id).await? {
          Some(review) => Ok(ModerationOutcome::Applied { review, previous }),
          None => Ok(ModerationOutcome::Missing),
        }
      }
      RawModeration::Missing => Ok(ModerationOutcome::Missing),
    }
  }

  async fn list_product_reviews(&self, product_id: &str) -> Result<Vec<Review>> {
    let product_id = product_id.to_owned();

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLUMNS} FROM reviews
           WHERE product_id = ?1 AND status = 'approved' AND is_current = 1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![product_id], read_review)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn list_customer_reviews(
    &self,
    customer_id: &CustomerId,
    product_id: &str,
  ) -> Result<Vec<Review>> {
    let customer_id = customer_id.0.clone();
    let product_id  = product_id.to_owned();

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLUMNS} FROM reviews
           WHERE customer_id = ?1 AND product_id = ?2
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![customer_id, product_id], read_review)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn rating_summary(&self, product_id: &str) -> Result<RatingSummary> {
    let product_id = product_id.to_owned();

    let counters: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT total_reviews, total_rating_sum FROM product_ratings
               WHERE product_id = ?1",
              rusqlite::params![product_id],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(match counters {
      Some((reviews, sum)) => RatingSummary::from_counters(reviews, sum),
      None => RatingSummary::zero(),
    })
  }

  // ── Purchases ─────────────────────────────────────────────────────────────

  async fn has_purchase(
    &self,
    customer_id: &CustomerId,
    product_id: &str,
  ) -> Result<bool> {
    let customer_id = customer_id.0.clone();
    let product_id  = product_id.to_owned();

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM purchases WHERE customer_id = ?1 AND product_id = ?2",
              rusqlite::params![customer_id, product_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn record_purchase(
    &self,
    customer_id: &CustomerId,
    product_id: &str,
  ) -> Result<()> {
    let customer_id = customer_id.0.clone();
    let product_id  = product_id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO purchases (customer_id, product_id) VALUES (?1, ?2)",
          rusqlite::params![customer_id, product_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Wishlist ──────────────────────────────────────────────────────────────

  async fn wishlist_add(
    &self,
    customer_id: &CustomerId,
    product_id: &str,
    at: DateTime<Utc>,
  ) -> Result<()> {
    let customer_id = customer_id.0.clone();
    let product_id  = product_id.to_owned();
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO wishlist_entries (customer_id, product_id, added_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![customer_id, product_id, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn wishlist_remove(
    &self,
    customer_id: &CustomerId,
    product_id: &str,
  ) -> Result<()> {
    let customer_id = customer_id.0.clone();
    let product_id  = product_id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM wishlist_entries WHERE customer_id = ?1 AND product_id = ?2",
          rusqlite::params![customer_id, product_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn wishlist_contains(
    &self,
    customer_id: &CustomerId,
    product_id: &str,
  ) -> Result<bool> {
    let customer_id = customer_id.0.clone();
    let product_id  = product_id.to_owned();

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM wishlist_entries
               WHERE customer_id = ?1 AND product_id = ?2",
              rusqlite::params![customer_id, product_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn wishlist_list(&self, customer_id: &CustomerId) -> Result<BTreeSet<String>> {
    let customer_id = customer_id.0.clone();

    let products: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT product_id FROM wishlist_entries WHERE customer_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![customer_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(products.into_iter().collect())
  }

  // ── Credential tokens ─────────────────────────────────────────────────────

  async fn resolve_token(&self, digest: &str) -> Result<Option<CustomerId>> {
    let digest = digest.to_owned();

    let customer: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT customer_id FROM customer_tokens WHERE token_digest = ?1",
              rusqlite::params![digest],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(customer.map(CustomerId))
  }

  async fn register_token(
    &self,
    digest: &str,
    customer_id: &CustomerId,
  ) -> Result<()> {
    let digest      = digest.to_owned();
    let customer_id = customer_id.0.clone();
    let now_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO customer_tokens (token_digest, customer_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![digest, customer_id, now_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
