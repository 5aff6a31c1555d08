//! crates/hronir_store/src/schema.rs
//! Schema creation. Applied once, idempotently, at `Store::open`.
//! One authoritative embedded database — no legacy CSV/JSON storage tiers.

use rusqlite::Connection;

pub(crate) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS hronirs (
            id         TEXT PRIMARY KEY,
            text       TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS paths (
            path_uuid    TEXT PRIMARY KEY,
            position     INTEGER NOT NULL,
            predecessor  TEXT,
            current      TEXT NOT NULL REFERENCES hronirs(id),
            status       TEXT NOT NULL,
            mandate_id   TEXT,
            is_canonical INTEGER NOT NULL DEFAULT 0,
            elo_rating   REAL NOT NULL,
            created_at   TEXT NOT NULL,
            UNIQUE(position, predecessor, current)
        );

        CREATE INDEX IF NOT EXISTS idx_paths_position_predecessor
            ON paths(position, predecessor);
        CREATE INDEX IF NOT EXISTS idx_paths_status
            ON paths(status);

        CREATE TABLE IF NOT EXISTS transactions (
            tx_id         TEXT PRIMARY KEY,
            sequence      INTEGER NOT NULL UNIQUE,
            prev_sequence INTEGER NOT NULL,
            prev_tx_hash  TEXT NOT NULL,
            voting_token  TEXT NOT NULL REFERENCES paths(path_uuid),
            content_hash  TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_sequence
            ON transactions(sequence);

        CREATE TABLE IF NOT EXISTS votes (
            vote_id      TEXT PRIMARY KEY,
            position     INTEGER NOT NULL,
            voting_token TEXT NOT NULL REFERENCES paths(path_uuid),
            path_a       TEXT NOT NULL REFERENCES paths(path_uuid),
            path_b       TEXT NOT NULL REFERENCES paths(path_uuid),
            chosen_side  TEXT NOT NULL,
            tx_id        TEXT NOT NULL REFERENCES transactions(tx_id),
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS consumed_tokens (
            voting_token TEXT PRIMARY KEY
        );
        "#,
    )
}
