//! crates/hronir_engine/src/cascade.rs
//! The canonical cascade: after a transaction mutates Elo at
//! `from_position`, recompute `is_canonical` flags forward from there.
//!
//! At each position `P` starting from `from_position`: find the canonical
//! path at `P - 1` (or treat position 0 as having an implicit canonical
//! nil-predecessor); among paths in the `(P, predecessor)` cohort, pick the
//! highest-Elo path regardless of lifecycle status (ties broken
//! lexicographically by `path_uuid`); mark it canonical, clear every other
//! path at `P`, and continue to `P + 1` using the freshly chosen hrönir as
//! the new predecessor context. Stop and clear all flags at and above `P`
//! once there is no canonical predecessor or no eligible path in the cohort.

use hronir_core::error::EngineError;
use hronir_core::model::Path;
use hronir_store::dao;
use rusqlite::Connection;
use uuid::Uuid;

/// Recompute canonicity at `from_position` and every position after it,
/// stopping as soon as a position has no canonical predecessor or no
/// eligible candidate. Idempotent: running it twice with no intervening
/// writes touches zero additional rows.
pub fn cascade(conn: &Connection, from_position: u64) -> Result<(), EngineError> {
    let mut position = from_position;
    let mut predecessor = canonical_predecessor_hronir(conn, position)?;

    loop {
        let pred = match predecessor {
            Some(p) => p,
            None => {
                dao::clear_canonical_from(conn, position).map_err(hronir_core::error::storage_error)?;
                return Ok(());
            }
        };

        let cohort = dao::list_cohort(conn, position, pred).map_err(hronir_core::error::storage_error)?;
        match pick_canonical_winner(&cohort) {
            None => {
                dao::clear_canonical_from(conn, position).map_err(hronir_core::error::storage_error)?;
                return Ok(());
            }
            Some(winner_path) => {
                dao::set_canonical(conn, winner_path.path_uuid, true).map_err(hronir_core::error::storage_error)?;
                dao::clear_other_canonical_at(conn, position, winner_path.path_uuid)
                    .map_err(hronir_core::error::storage_error)?;
                predecessor = Some(winner_path.current);
                position += 1;
            }
        }
    }
}

/// The hrönir that heads the canonical path at `position - 1` (or
/// `Uuid::nil()`'s implicit context when `position == 0`, since position 0's
/// only valid predecessor already is the nil sentinel).
fn canonical_predecessor_hronir(conn: &Connection, position: u64) -> Result<Option<Uuid>, EngineError> {
    if position == 0 {
        return Ok(Some(Uuid::nil()));
    }
    let canonical_prev = dao::get_canonical_at_position(conn, position - 1).map_err(hronir_core::error::storage_error)?;
    Ok(canonical_prev.map(|p| p.current))
}

/// Highest-Elo path in the cohort, ties broken lexicographically by
/// `path_uuid`. Every registered path (any lifecycle status) is an eligible
/// candidate for canonicity: canonicity tracks the best-rated edge, not
/// voting eligibility.
fn pick_canonical_winner(cohort: &[Path]) -> Option<&Path> {
    cohort.iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current_best) => {
            if candidate.elo_rating > current_best.elo_rating
                || (candidate.elo_rating == current_best.elo_rating && candidate.path_uuid < current_best.path_uuid)
            {
                Some(candidate)
            } else {
                Some(current_best)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_is_highest_elo_ties_broken_by_uuid() {
        let a = sample_path(1, 1500.0);
        let b = sample_path(2, 1500.0);
        let c = sample_path(3, 1400.0);
        let cohort = vec![c, b, a];
        let winner = pick_canonical_winner(&cohort).unwrap();
        assert_eq!(winner.path_uuid, Uuid::from_bytes([1; 16]));
    }

    #[test]
    fn empty_cohort_has_no_winner() {
        assert!(pick_canonical_winner(&[]).is_none());
    }

    fn sample_path(byte: u8, elo: f64) -> Path {
        Path {
            path_uuid: Uuid::from_bytes([byte; 16]),
            position: 1,
            predecessor: Uuid::nil(),
            current: Uuid::from_bytes([0xAA; 16]),
            status: hronir_core::model::PathStatus::Pending,
            mandate_id: None,
            is_canonical: false,
            elo_rating: elo,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }
}
