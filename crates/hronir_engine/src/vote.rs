//! crates/hronir_engine/src/vote.rs
//! `cast_vote`: the single atomic operation that consumes a
//! mandate, records 1..k verdicts, updates Elo and qualification, appends a
//! ledger transaction, and triggers the canonical cascade.

use hronir_core::error::{EngineError, NotFoundKind};
use hronir_core::model::{ChosenSide, Transaction, Verdict, Vote};
use hronir_store::dao;
use rusqlite::Connection;
use uuid::Uuid;

use crate::cascade;
use crate::config::EngineConfig;
use crate::mandate;

pub fn cast_vote(
    conn: &Connection,
    config: &EngineConfig,
    voting_token: Uuid,
    verdicts: &[Verdict],
    now: &str,
) -> Result<Transaction, EngineError> {
    if dao::is_consumed(conn, voting_token).map_err(hronir_core::error::storage_error)? {
        return Err(EngineError::Mandate(hronir_core::error::MandateError::AlreadySpent));
    }

    let token_path = mandate::resolve_voting_token(conn, voting_token)?;
    let capacity = mandate::check_and_capacity(&token_path)?;

    if verdicts.is_empty() || verdicts.len() as u64 > capacity {
        return Err(EngineError::OverCapacity(
            "verdict count must be between 1 and the voting token's ⌈√N⌉ capacity",
        ));
    }

    let mut target_positions: Vec<u64> = verdicts.iter().map(|v| v.target_position).collect();
    target_positions.sort_unstable();
    target_positions.dedup();
    if target_positions.len() != verdicts.len() {
        return Err(EngineError::DuplicateVote("duplicate target_position across verdicts"));
    }
    if verdicts.iter().any(|v| v.target_position >= token_path.position) {
        return Err(EngineError::DuplicateVote(
            "verdict target_position must be strictly less than the voting token's position",
        ));
    }

    // Verdicts are applied in ascending target_position.
    let mut ordered: Vec<&Verdict> = verdicts.iter().collect();
    ordered.sort_by_key(|v| v.target_position);

    // Verify every verdict names the currently active duel before mutating anything.
    for verdict in &ordered {
        verify_active_duel(conn, verdict)?;
    }

    let vote_ids: Vec<Uuid> = ordered.iter().map(|_| Uuid::new_v4()).collect();
    let (tx, mandate) = crate::ledger::append(conn, voting_token, &vote_ids, now)?;

    for (verdict, vote_id) in ordered.iter().zip(vote_ids.iter()) {
        apply_verdict(conn, config, verdict, *vote_id, tx.tx_id, voting_token, now)?;
    }

    dao::spend_path(conn, voting_token, mandate).map_err(hronir_core::error::storage_error)?;
    dao::mark_consumed(conn, voting_token).map_err(hronir_core::error::storage_error)?;

    let min_position = target_positions.first().copied().unwrap_or(0);
    cascade::cascade(conn, min_position)?;

    Ok(tx)
}

fn canonical_predecessor_for(conn: &Connection, target_position: u64) -> Result<Option<Uuid>, EngineError> {
    if target_position == 0 {
        return Ok(Some(Uuid::nil()));
    }
    let canonical_prev = dao::get_canonical_at_position(conn, target_position - 1)
        .map_err(hronir_core::error::storage_error)?;
    Ok(canonical_prev.map(|p| p.current))
}

fn verify_active_duel(conn: &Connection, verdict: &Verdict) -> Result<(), EngineError> {
    let predecessor = canonical_predecessor_for(conn, verdict.target_position)?;
    let predecessor = match predecessor {
        Some(p) => p,
        None => {
            return Err(EngineError::DuelMismatch {
                position: verdict.target_position,
            })
        }
    };

    let cohort = dao::list_cohort(conn, verdict.target_position, predecessor).map_err(hronir_core::error::storage_error)?;
    let active = hronir_rating::duel::select_max_entropy(&cohort).ok_or(EngineError::DuelMismatch {
        position: verdict.target_position,
    })?;

    let (lo, hi) = if verdict.winner_path <= verdict.loser_path {
        (verdict.winner_path, verdict.loser_path)
    } else {
        (verdict.loser_path, verdict.winner_path)
    };
    if (lo, hi) != (active.path_a, active.path_b) {
        return Err(EngineError::DuelMismatch {
            position: verdict.target_position,
        });
    }
    Ok(())
}

fn apply_verdict(
    conn: &Connection,
    config: &EngineConfig,
    verdict: &Verdict,
    vote_id: Uuid,
    tx_id: Uuid,
    voting_token: Uuid,
    now: &str,
) -> Result<(), EngineError> {
    let predecessor = canonical_predecessor_for(conn, verdict.target_position)?
        .expect("verify_active_duel already confirmed a canonical predecessor exists");

    let winner = dao::get_path(conn, verdict.winner_path)
        .map_err(hronir_core::error::storage_error)?
        .ok_or(EngineError::NotFound(NotFoundKind::Path(verdict.winner_path)))?;
    let loser = dao::get_path(conn, verdict.loser_path)
        .map_err(hronir_core::error::storage_error)?
        .ok_or(EngineError::NotFound(NotFoundKind::Path(verdict.loser_path)))?;

    let (new_winner_elo, new_loser_elo) = hronir_rating::elo::update(winner.elo_rating, loser.elo_rating, config.elo_k);
    dao::update_path_elo(conn, winner.path_uuid, new_winner_elo).map_err(hronir_core::error::storage_error)?;
    dao::update_path_elo(conn, loser.path_uuid, new_loser_elo).map_err(hronir_core::error::storage_error)?;

    let (path_a, path_b) = if winner.path_uuid <= loser.path_uuid {
        (winner.path_uuid, loser.path_uuid)
    } else {
        (loser.path_uuid, winner.path_uuid)
    };
    let chosen_side = if verdict.winner_path == path_a { ChosenSide::A } else { ChosenSide::B };

    dao::insert_vote(
        conn,
        &Vote {
            vote_id,
            position: verdict.target_position,
            voting_token,
            path_a,
            path_b,
            chosen_side,
            tx_id,
            created_at: now.to_string(),
        },
    )
    .map_err(hronir_core::error::storage_error)?;

    re_evaluate_qualification(conn, config, verdict.target_position, predecessor)?;
    Ok(())
}

fn re_evaluate_qualification(
    conn: &Connection,
    config: &EngineConfig,
    position: u64,
    predecessor: Uuid,
) -> Result<(), EngineError> {
    let cohort = dao::list_cohort(conn, position, predecessor).map_err(hronir_core::error::storage_error)?;
    let participations = |path_uuid: Uuid| dao::count_participations(conn, path_uuid).unwrap_or(0);
    let newly_qualified = hronir_rating::qualification::evaluate(&cohort, participations, config.min_votes, config.delta);
    for path_uuid in newly_qualified {
        dao::update_path_status(conn, path_uuid, hronir_core::model::PathStatus::Qualified)
            .map_err(hronir_core::error::storage_error)?;
    }
    Ok(())
}
