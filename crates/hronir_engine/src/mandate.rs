//! crates/hronir_engine/src/mandate.rs
//! Mandate preconditions: a voting token must be a path that is
//! QUALIFIED, not yet SPENT, and carries nonzero voting power.

use hronir_core::error::{EngineError, MandateError, NotFoundKind};
use hronir_core::model::{Path, PathStatus};
use hronir_core::voting_power::voting_power;

/// Resolve the voting capacity of `path`, or the specific `ErrMandate` cause
/// that forbids using it as a voting token.
pub fn check_and_capacity(path: &Path) -> Result<u64, EngineError> {
    match path.status {
        PathStatus::Pending => return Err(EngineError::Mandate(MandateError::NotQualified)),
        PathStatus::Spent => return Err(EngineError::Mandate(MandateError::AlreadySpent)),
        PathStatus::Qualified => {}
    }
    let capacity = voting_power(path.position);
    if capacity == 0 {
        return Err(EngineError::Mandate(MandateError::ZeroVotingPower));
    }
    Ok(capacity)
}

/// Looks up a path by its id, surfacing `ErrNotFound` rather than
/// `ErrMandate::UnknownToken` when the row simply does not exist — the
/// mandate-specific "unknown token" variant is reserved for callers that
/// want to report both cases the same way (see `hronir_engine::vote`).
pub fn resolve_voting_token(
    conn: &rusqlite::Connection,
    voting_token: uuid::Uuid,
) -> Result<Path, EngineError> {
    hronir_store::dao::get_path(conn, voting_token)
        .map_err(hronir_core::error::storage_error)?
        .ok_or(EngineError::NotFound(NotFoundKind::Path(voting_token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample(status: PathStatus, position: u64) -> Path {
        Path {
            path_uuid: Uuid::from_bytes([1; 16]),
            position,
            predecessor: Uuid::nil(),
            current: Uuid::from_bytes([2; 16]),
            status,
            mandate_id: None,
            is_canonical: false,
            elo_rating: 1500.0,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn pending_path_is_not_qualified() {
        let err = check_and_capacity(&sample(PathStatus::Pending, 2)).unwrap_err();
        assert!(matches!(err, EngineError::Mandate(MandateError::NotQualified)));
    }

    #[test]
    fn spent_path_is_rejected() {
        let err = check_and_capacity(&sample(PathStatus::Spent, 2)).unwrap_err();
        assert!(matches!(err, EngineError::Mandate(MandateError::AlreadySpent)));
    }

    #[test]
    fn position_zero_has_zero_voting_power() {
        let err = check_and_capacity(&sample(PathStatus::Qualified, 0)).unwrap_err();
        assert!(matches!(err, EngineError::Mandate(MandateError::ZeroVotingPower)));
    }

    #[test]
    fn qualified_position_two_has_capacity_two() {
        let capacity = check_and_capacity(&sample(PathStatus::Qualified, 2)).unwrap();
        assert_eq!(capacity, 2);
    }
}
