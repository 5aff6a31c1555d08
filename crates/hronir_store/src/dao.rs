//! crates/hronir_store/src/dao.rs
//! Row-level CRUD. No business rules live here — a pure I/O layer; callers
//! in `hronir_engine` compose these calls inside their own transactions.

use hronir_core::model::{ChosenSide, Hronir, Path, PathStatus, Transaction, Vote};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

fn uuid_to_text(id: Uuid) -> String {
    id.to_string()
}

fn text_to_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| rusqlite::Error::InvalidColumnType(0, e.to_string(), rusqlite::types::Type::Text))
}

fn hex_to_hash32(s: &str) -> rusqlite::Result<[u8; 32]> {
    let bytes = hex::decode(s)
        .map_err(|e| rusqlite::Error::InvalidColumnType(0, e.to_string(), rusqlite::types::Type::Text))?;
    bytes
        .try_into()
        .map_err(|_| rusqlite::Error::InvalidColumnType(0, "expected 32 bytes".into(), rusqlite::types::Type::Text))
}

fn hex_to_mandate16(s: &str) -> rusqlite::Result<[u8; 16]> {
    let bytes = hex::decode(s)
        .map_err(|e| rusqlite::Error::InvalidColumnType(0, e.to_string(), rusqlite::types::Type::Text))?;
    bytes
        .try_into()
        .map_err(|_| rusqlite::Error::InvalidColumnType(0, "expected 16 bytes".into(), rusqlite::types::Type::Text))
}

// --------------------------------- hronirs ---------------------------------

pub fn insert_hronir(conn: &Connection, h: &Hronir) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO hronirs (id, text, created_at) VALUES (?1, ?2, ?3)",
        params![uuid_to_text(h.id), h.text, h.created_at],
    )?;
    Ok(())
}

pub fn get_hronir(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Hronir>> {
    conn.query_row(
        "SELECT id, text, created_at FROM hronirs WHERE id = ?1",
        params![uuid_to_text(id)],
        map_hronir,
    )
    .optional()
}

pub fn hronir_exists(conn: &Connection, id: Uuid) -> rusqlite::Result<bool> {
    Ok(get_hronir(conn, id)?.is_some())
}

fn map_hronir(row: &Row<'_>) -> rusqlite::Result<Hronir> {
    let id_s: String = row.get(0)?;
    Ok(Hronir {
        id: text_to_uuid(&id_s)?,
        text: row.get(1)?,
        created_at: row.get(2)?,
    })
}

// ---------------------------------- paths -----------------------------------

pub fn insert_path(conn: &Connection, p: &Path) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO paths (path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            uuid_to_text(p.path_uuid),
            p.position as i64,
            uuid_to_text(p.predecessor),
            uuid_to_text(p.current),
            p.status.as_str(),
            p.mandate_id.map(hex::encode),
            p.is_canonical as i64,
            p.elo_rating,
            p.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_path(conn: &Connection, path_uuid: Uuid) -> rusqlite::Result<Option<Path>> {
    conn.query_row(
        "SELECT path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at
         FROM paths WHERE path_uuid = ?1",
        params![uuid_to_text(path_uuid)],
        map_path,
    )
    .optional()
}

pub fn find_path_by_triple(
    conn: &Connection,
    position: u64,
    predecessor: Uuid,
    current: Uuid,
) -> rusqlite::Result<Option<Path>> {
    conn.query_row(
        "SELECT path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at
         FROM paths WHERE position = ?1 AND predecessor = ?2 AND current = ?3",
        params![position as i64, uuid_to_text(predecessor), uuid_to_text(current)],
        map_path,
    )
    .optional()
}

/// All paths sharing a `(position, predecessor)` cohort.
pub fn list_cohort(conn: &Connection, position: u64, predecessor: Uuid) -> rusqlite::Result<Vec<Path>> {
    let mut stmt = conn.prepare(
        "SELECT path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at
         FROM paths WHERE position = ?1 AND predecessor = ?2",
    )?;
    let rows = stmt.query_map(params![position as i64, uuid_to_text(predecessor)], map_path)?;
    rows.collect()
}

/// All `(predecessor, current)` edges, regardless of position — the basis
/// for the cross-position cycle check.
pub fn list_all_edges(conn: &Connection) -> rusqlite::Result<Vec<(Uuid, Uuid)>> {
    let mut stmt = conn.prepare("SELECT predecessor, current FROM paths")?;
    let rows = stmt.query_map([], |row| {
        let pred: String = row.get(0)?;
        let cur: String = row.get(1)?;
        Ok((text_to_uuid(&pred)?, text_to_uuid(&cur)?))
    })?;
    rows.collect()
}

pub fn list_all_paths(conn: &Connection) -> rusqlite::Result<Vec<Path>> {
    let mut stmt = conn.prepare(
        "SELECT path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at
         FROM paths",
    )?;
    let rows = stmt.query_map([], map_path)?;
    rows.collect()
}

pub fn update_path_status(conn: &Connection, path_uuid: Uuid, status: PathStatus) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE paths SET status = ?1 WHERE path_uuid = ?2",
        params![status.as_str(), uuid_to_text(path_uuid)],
    )?;
    Ok(())
}

pub fn update_path_elo(conn: &Connection, path_uuid: Uuid, elo: f64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE paths SET elo_rating = ?1 WHERE path_uuid = ?2",
        params![elo, uuid_to_text(path_uuid)],
    )?;
    Ok(())
}

/// Mark `path_uuid` SPENT and stamp its `mandate_id` in one statement (spec
/// §4.5 commit step 4: "Mark `voting_token` as SPENT").
pub fn spend_path(conn: &Connection, path_uuid: Uuid, mandate_id: [u8; 16]) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE paths SET status = ?1, mandate_id = ?2 WHERE path_uuid = ?3",
        params![PathStatus::Spent.as_str(), hex::encode(mandate_id), uuid_to_text(path_uuid)],
    )?;
    Ok(())
}

pub fn set_canonical(conn: &Connection, path_uuid: Uuid, is_canonical: bool) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE paths SET is_canonical = ?1 WHERE path_uuid = ?2",
        params![is_canonical as i64, uuid_to_text(path_uuid)],
    )?;
    Ok(())
}

/// Clear every `is_canonical` flag at `position >= from_position`.
pub fn clear_canonical_from(conn: &Connection, from_position: u64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE paths SET is_canonical = 0 WHERE position >= ?1 AND is_canonical = 1",
        params![from_position as i64],
    )?;
    Ok(())
}

/// Clear every other path at `position` so at most one stays canonical.
pub fn clear_other_canonical_at(conn: &Connection, position: u64, keep: Uuid) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE paths SET is_canonical = 0 WHERE position = ?1 AND path_uuid != ?2 AND is_canonical = 1",
        params![position as i64, uuid_to_text(keep)],
    )?;
    Ok(())
}

pub fn get_canonical_at_position(conn: &Connection, position: u64) -> rusqlite::Result<Option<Path>> {
    conn.query_row(
        "SELECT path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at
         FROM paths WHERE position = ?1 AND is_canonical = 1",
        params![position as i64],
        map_path,
    )
    .optional()
}

pub fn list_canonical_path(conn: &Connection) -> rusqlite::Result<Vec<Path>> {
    let mut stmt = conn.prepare(
        "SELECT path_uuid, position, predecessor, current, status, mandate_id, is_canonical, elo_rating, created_at
         FROM paths WHERE is_canonical = 1 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([], map_path)?;
    rows.collect()
}

fn map_path(row: &Row<'_>) -> rusqlite::Result<Path> {
    let path_uuid_s: String = row.get(0)?;
    let position: i64 = row.get(1)?;
    let predecessor_s: String = row.get(2)?;
    let current_s: String = row.get(3)?;
    let status_s: String = row.get(4)?;
    let mandate_s: Option<String> = row.get(5)?;
    let is_canonical: i64 = row.get(6)?;
    let elo_rating: f64 = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Path {
        path_uuid: text_to_uuid(&path_uuid_s)?,
        position: position as u64,
        predecessor: text_to_uuid(&predecessor_s)?,
        current: text_to_uuid(&current_s)?,
        status: PathStatus::parse(&status_s).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(4, status_s.clone(), rusqlite::types::Type::Text)
        })?,
        mandate_id: mandate_s.map(|s| hex_to_mandate16(&s)).transpose()?,
        is_canonical: is_canonical != 0,
        elo_rating,
        created_at,
    })
}

/// How many votes reference `path_uuid` as either side of the duel
/// (`path_a` or `path_b`) — the "recorded vote participations" count used by
/// qualification evaluation.
pub fn count_participations(conn: &Connection, path_uuid: Uuid) -> rusqlite::Result<u64> {
    let id = uuid_to_text(path_uuid);
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM votes WHERE path_a = ?1 OR path_b = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

// ---------------------------------- votes -----------------------------------

pub fn insert_vote(conn: &Connection, v: &Vote) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO votes (vote_id, position, voting_token, path_a, path_b, chosen_side, tx_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            uuid_to_text(v.vote_id),
            v.position as i64,
            uuid_to_text(v.voting_token),
            uuid_to_text(v.path_a),
            uuid_to_text(v.path_b),
            v.chosen_side.as_str(),
            uuid_to_text(v.tx_id),
            v.created_at,
        ],
    )?;
    Ok(())
}

pub fn list_all_votes(conn: &Connection) -> rusqlite::Result<Vec<Vote>> {
    let mut stmt = conn.prepare(
        "SELECT vote_id, position, voting_token, path_a, path_b, chosen_side, tx_id, created_at FROM votes",
    )?;
    let rows = stmt.query_map([], |row| {
        let vote_id_s: String = row.get(0)?;
        let position: i64 = row.get(1)?;
        let token_s: String = row.get(2)?;
        let a_s: String = row.get(3)?;
        let b_s: String = row.get(4)?;
        let side_s: String = row.get(5)?;
        let tx_s: String = row.get(6)?;
        let created_at: String = row.get(7)?;
        Ok(Vote {
            vote_id: text_to_uuid(&vote_id_s)?,
            position: position as u64,
            voting_token: text_to_uuid(&token_s)?,
            path_a: text_to_uuid(&a_s)?,
            path_b: text_to_uuid(&b_s)?,
            chosen_side: ChosenSide::parse(&side_s).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(5, side_s.clone(), rusqlite::types::Type::Text)
            })?,
            tx_id: text_to_uuid(&tx_s)?,
            created_at,
        })
    })?;
    rows.collect()
}

// ------------------------------- transactions --------------------------------

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO transactions (tx_id, sequence, prev_sequence, prev_tx_hash, voting_token, content_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            uuid_to_text(tx.tx_id),
            tx.sequence,
            tx.prev_sequence,
            hex::encode(tx.prev_tx_hash),
            uuid_to_text(tx.voting_token),
            hex::encode(tx.content_hash),
            tx.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_max_sequence(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    conn.query_row("SELECT MAX(sequence) FROM transactions", [], |row| row.get(0))
}

pub fn get_transaction_by_sequence(conn: &Connection, sequence: i64) -> rusqlite::Result<Option<Transaction>> {
    conn.query_row(
        "SELECT tx_id, sequence, prev_sequence, prev_tx_hash, voting_token, content_hash, created_at
         FROM transactions WHERE sequence = ?1",
        params![sequence],
        map_transaction,
    )
    .optional()
}

pub fn list_all_transactions_ordered(conn: &Connection) -> rusqlite::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT tx_id, sequence, prev_sequence, prev_tx_hash, voting_token, content_hash, created_at
         FROM transactions ORDER BY sequence ASC",
    )?;
    let rows = stmt.query_map([], map_transaction)?;
    rows.collect()
}

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let tx_id_s: String = row.get(0)?;
    let sequence: i64 = row.get(1)?;
    let prev_sequence: i64 = row.get(2)?;
    let prev_hash_s: String = row.get(3)?;
    let token_s: String = row.get(4)?;
    let content_hash_s: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(Transaction {
        tx_id: text_to_uuid(&tx_id_s)?,
        sequence,
        prev_sequence,
        prev_tx_hash: hex_to_hash32(&prev_hash_s)?,
        voting_token: text_to_uuid(&token_s)?,
        content_hash: hex_to_hash32(&content_hash_s)?,
        created_at,
    })
}

// ----------------------------- consumed_tokens --------------------------------

pub fn mark_consumed(conn: &Connection, path_uuid: Uuid) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO consumed_tokens (voting_token) VALUES (?1)",
        params![uuid_to_text(path_uuid)],
    )?;
    Ok(())
}

pub fn is_consumed(conn: &Connection, path_uuid: Uuid) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM consumed_tokens WHERE voting_token = ?1",
        params![uuid_to_text(path_uuid)],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_all_hronirs(conn: &Connection) -> rusqlite::Result<Vec<Hronir>> {
    let mut stmt = conn.prepare("SELECT id, text, created_at FROM hronirs")?;
    let rows = stmt.query_map([], map_hronir)?;
    rows.collect()
}
