//! crates/hronir_rating/src/ranking.rs
//! Cohort ranking: Elo descending, ties broken
//! lexicographically by `path_uuid`.

use hronir_core::model::{Path, RankingEntry};

/// Order a `(position, predecessor)` cohort for presentation. Callers supply
/// the cohort already filtered to the matching `(position, predecessor)`
/// pair (position 0's only valid predecessor is `Uuid::nil()`).
pub fn rank(cohort: &[Path]) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = cohort
        .iter()
        .map(|p| RankingEntry {
            path_uuid: p.path_uuid,
            elo: p.elo_rating,
            status: p.status,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.elo
            .partial_cmp(&a.elo)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path_uuid.cmp(&b.path_uuid))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use hronir_core::model::PathStatus;
    use uuid::Uuid;

    fn path(uuid_byte: u8, elo: f64) -> Path {
        Path {
            path_uuid: Uuid::from_bytes([uuid_byte; 16]),
            position: 1,
            predecessor: Uuid::nil(),
            current: Uuid::from_bytes([0xAA; 16]),
            status: PathStatus::Pending,
            mandate_id: None,
            is_canonical: false,
            elo_rating: elo,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn sorts_elo_descending() {
        let cohort = vec![path(1, 1400.0), path(2, 1600.0), path(3, 1500.0)];
        let ranked = rank(&cohort);
        assert_eq!(ranked[0].elo, 1600.0);
        assert_eq!(ranked[1].elo, 1500.0);
        assert_eq!(ranked[2].elo, 1400.0);
    }

    #[test]
    fn ties_break_by_path_uuid_ascending() {
        let cohort = vec![path(9, 1500.0), path(1, 1500.0)];
        let ranked = rank(&cohort);
        assert_eq!(ranked[0].path_uuid, Uuid::from_bytes([1; 16]));
        assert_eq!(ranked[1].path_uuid, Uuid::from_bytes([9; 16]));
    }
}
