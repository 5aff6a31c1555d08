//! crates/hronir_engine/src/ledger.rs
//! Append-only transaction ledger: sequence starts at 0,
//! `prev_sequence = -1` and a zero-byte `prev_tx_hash` sentinel for the
//! genesis row; every later row chains to the previous row's `content_hash`.

use hronir_core::error::EngineError;
use hronir_core::ids::{mandate_id, sha256_of_canonical_bytes, ZERO_HASH};
use hronir_core::model::{Transaction, TransactionContentBasis};
use hronir_store::dao;
use rusqlite::Connection;
use uuid::Uuid;

/// The `(sequence, prev_tx_hash)` a new transaction must chain from, derived
/// from the current tip of the ledger (or the genesis sentinel if empty).
pub struct LedgerTip {
    pub next_sequence: i64,
    pub prev_sequence: i64,
    pub prev_tx_hash: [u8; 32],
}

pub fn tip(conn: &Connection) -> Result<LedgerTip, EngineError> {
    let max_seq = dao::get_max_sequence(conn).map_err(hronir_core::error::storage_error)?;
    match max_seq {
        None => Ok(LedgerTip {
            next_sequence: 0,
            prev_sequence: -1,
            prev_tx_hash: ZERO_HASH,
        }),
        Some(seq) => {
            let last = dao::get_transaction_by_sequence(conn, seq)
                .map_err(hronir_core::error::storage_error)?
                .ok_or_else(|| EngineError::Integrity(format!("ledger tip at sequence {seq} is missing")))?;
            Ok(LedgerTip {
                next_sequence: seq + 1,
                prev_sequence: seq,
                prev_tx_hash: last.content_hash,
            })
        }
    }
}

/// Build and persist the transaction record for a `cast_vote` commit,
/// returning the mandate id it stamps on the spent path and the row that was
/// inserted.
pub fn append(
    conn: &Connection,
    voting_token: Uuid,
    vote_ids: &[Uuid],
    created_at: &str,
) -> Result<(Transaction, [u8; 16]), EngineError> {
    let tip = self::tip(conn)?;
    let tx_id = Uuid::new_v4();

    let basis = TransactionContentBasis {
        sequence: tip.next_sequence,
        prev_sequence: tip.prev_sequence,
        prev_tx_hash: hex::encode(tip.prev_tx_hash),
        voting_token,
        vote_ids,
        created_at,
    };
    let bytes = hronir_core::canonical_json::to_canonical_bytes(&basis)
        .map_err(|e| EngineError::Integrity(format!("failed to canonicalize transaction content: {e}")))?;
    let content_hash = sha256_of_canonical_bytes(&bytes);

    let tx = Transaction {
        tx_id,
        sequence: tip.next_sequence,
        prev_sequence: tip.prev_sequence,
        prev_tx_hash: tip.prev_tx_hash,
        voting_token,
        content_hash,
        created_at: created_at.to_string(),
    };
    dao::insert_transaction(conn, &tx).map_err(hronir_core::error::storage_error)?;

    let mandate = mandate_id(voting_token, &tip.prev_tx_hash);
    Ok((tx, mandate))
}

/// Walk the whole ledger and confirm both chain invariants hold: strictly
/// increasing sequence from 0, and each row's `prev_tx_hash` equal to the
/// previous row's `content_hash` (or the zero sentinel at genesis).
pub fn verify_chain(conn: &Connection) -> Result<(), EngineError> {
    let all = dao::list_all_transactions_ordered(conn).map_err(hronir_core::error::storage_error)?;
    let mut expected_seq: i64 = 0;
    let mut expected_prev_hash = ZERO_HASH;
    for tx in &all {
        if tx.sequence != expected_seq {
            return Err(EngineError::Integrity(format!(
                "ledger gap: expected sequence {expected_seq}, found {}",
                tx.sequence
            )));
        }
        if tx.prev_sequence != expected_seq - 1 {
            return Err(EngineError::Integrity(format!(
                "ledger break: tx {} has prev_sequence {} but predecessor sequence is {}",
                tx.tx_id,
                tx.prev_sequence,
                expected_seq - 1
            )));
        }
        if tx.prev_tx_hash != expected_prev_hash {
            return Err(EngineError::Integrity(format!(
                "ledger break: tx {} prev_tx_hash does not match predecessor content_hash",
                tx.tx_id
            )));
        }
        expected_seq += 1;
        expected_prev_hash = tx.content_hash;
    }
    Ok(())
}
