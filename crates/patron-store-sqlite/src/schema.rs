//! SQL schema for the Patron SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contact_tickets (
    ticket_id   TEXT PRIMARY KEY,
    email       TEXT NOT NULL,
    status      TEXT NOT NULL,
    payload     TEXT NOT NULL DEFAULT '{}',  -- schema-validated JSON object
    source      TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,               -- ISO 8601 UTC; server-assigned
    updated_at  TEXT NOT NULL
);

-- Status history is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS ticket_status_history (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id   TEXT NOT NULL REFERENCES contact_tickets(ticket_id),
    from_status TEXT,                        -- NULL for the creation entry
    to_status   TEXT NOT NULL,
    note        TEXT,
    recorded_at TEXT NOT NULL
);

-- One row per normalized lowercase email; writes are upserts.
CREATE TABLE IF NOT EXISTS subscriptions (
    email       TEXT PRIMARY KEY,
    status      TEXT NOT NULL,               -- 'subscribed' | 'unsubscribed'
    source      TEXT NOT NULL DEFAULT '',
    metadata    TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Historical reviews are retained with is_current = 0; at most one current
-- row per (customer_id, product_id).
CREATE TABLE IF NOT EXISTS reviews (
    review_id         TEXT PRIMARY KEY,
    product_id        TEXT NOT NULL,
    customer_id       TEXT,                  -- NULL once anonymized
    rating            INTEGER NOT NULL,      -- 1..=5, validated upstream
    title             TEXT,
    description       TEXT,
    status            TEXT NOT NULL,         -- 'pending'|'approved'|'rejected'
    verified_purchase INTEGER NOT NULL DEFAULT 0,
    is_current        INTEGER NOT NULL DEFAULT 1,
    created_at        TEXT NOT NULL
);

-- Running counters over current approved reviews; the average is derived.
CREATE TABLE IF NOT EXISTS product_ratings (
    product_id       TEXT PRIMARY KEY,
    total_reviews    INTEGER NOT NULL DEFAULT 0,
    total_rating_sum INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS wishlist_entries (
    customer_id TEXT NOT NULL,
    product_id  TEXT NOT NULL,
    added_at    TEXT NOT NULL,
    PRIMARY KEY (customer_id, product_id)
);

-- Synced in by the commerce platform; consulted for verified_purchase.
CREATE TABLE IF NOT EXISTS purchases (
    customer_id TEXT NOT NULL,
    product_id  TEXT NOT NULL,
    PRIMARY KEY (customer_id, product_id)
);

-- Bearer tokens are stored only as SHA-256 hex digests.
CREATE TABLE IF NOT EXISTS customer_tokens (
    token_digest TEXT PRIMARY KEY,
    customer_id  TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS history_ticket_idx   ON ticket_status_history(ticket_id);
CREATE INDEX IF NOT EXISTS reviews_product_idx  ON reviews(product_id);
CREATE INDEX IF NOT EXISTS reviews_customer_idx ON reviews(customer_id, product_id);

PRAGMA user_version = 1;
";
