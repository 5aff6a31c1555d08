//! crates/hronir_rating/src/qualification.rs
//! A PENDING path becomes QUALIFIED when, within its `(position, predecessor)`
//! cohort, it has at least `min_votes` recorded vote participations *and* an
//! Elo strictly greater than the cohort median by at least `delta`.

use hronir_core::model::{Path, PathStatus};
use uuid::Uuid;

/// Default minimum vote-participation count before a path is eligible.
pub const DEFAULT_MIN_VOTES: u64 = 1;
/// Default qualification margin above the cohort median.
pub const DEFAULT_DELTA: f64 = 0.0;

/// The cohort median Elo. Even-sized cohorts average the two middle values.
pub fn cohort_median(cohort: &[Path]) -> f64 {
    if cohort.is_empty() {
        return 0.0;
    }
    let mut elos: Vec<f64> = cohort.iter().map(|p| p.elo_rating).collect();
    elos.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = elos.len();
    if n % 2 == 1 {
        elos[n / 2]
    } else {
        (elos[n / 2 - 1] + elos[n / 2]) / 2.0
    }
}

/// `path_uuid`s of every still-PENDING path in `cohort` that now meets the
/// qualification threshold, given each path's recorded vote-participation
/// count (caller supplies this from the votes table — counting both
/// `path_a` and `path_b` appearances).
pub fn evaluate(
    cohort: &[Path],
    participations: impl Fn(Uuid) -> u64,
    min_votes: u64,
    delta: f64,
) -> Vec<Uuid> {
    let median = cohort_median(cohort);
    cohort
        .iter()
        .filter(|p| p.status == PathStatus::Pending)
        .filter(|p| participations(p.path_uuid) >= min_votes)
        .filter(|p| p.elo_rating > median + delta)
        .map(|p| p.path_uuid)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn path(byte: u8, elo: f64, status: PathStatus) -> Path {
        Path {
            path_uuid: Uuid::from_bytes([byte; 16]),
            position: 1,
            predecessor: Uuid::nil(),
            current: Uuid::from_bytes([0xAA; 16]),
            status,
            mandate_id: None,
            is_canonical: false,
            elo_rating: elo,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn median_of_odd_cohort_is_middle_value() {
        let cohort = vec![
            path(1, 1400.0, PathStatus::Pending),
            path(2, 1500.0, PathStatus::Pending),
            path(3, 1600.0, PathStatus::Pending),
        ];
        assert_eq!(cohort_median(&cohort), 1500.0);
    }

    #[test]
    fn median_of_even_cohort_averages_middle_two() {
        let cohort = vec![
            path(1, 1400.0, PathStatus::Pending),
            path(2, 1500.0, PathStatus::Pending),
            path(3, 1600.0, PathStatus::Pending),
            path(4, 1700.0, PathStatus::Pending),
        ];
        assert_eq!(cohort_median(&cohort), 1550.0);
    }

    #[test]
    fn strictly_above_median_with_enough_votes_qualifies() {
        let cohort = vec![
            path(1, 1400.0, PathStatus::Pending),
            path(2, 1600.0, PathStatus::Pending),
        ];
        let votes = |_id: Uuid| 1u64;
        let qualified = evaluate(&cohort, votes, DEFAULT_MIN_VOTES, DEFAULT_DELTA);
        assert_eq!(qualified, vec![Uuid::from_bytes([2; 16])]);
    }

    #[test]
    fn insufficient_votes_blocks_qualification_even_above_median() {
        let cohort = vec![
            path(1, 1400.0, PathStatus::Pending),
            path(2, 1600.0, PathStatus::Pending),
        ];
        let votes = |_id: Uuid| 0u64;
        let qualified = evaluate(&cohort, votes, DEFAULT_MIN_VOTES, DEFAULT_DELTA);
        assert!(qualified.is_empty());
    }

    #[test]
    fn already_qualified_or_spent_paths_are_not_re_evaluated() {
        let cohort = vec![path(1, 1900.0, PathStatus::Qualified), path(2, 1400.0, PathStatus::Spent)];
        let votes = |_id: Uuid| 5u64;
        let qualified = evaluate(&cohort, votes, DEFAULT_MIN_VOTES, DEFAULT_DELTA);
        assert!(qualified.is_empty());
    }
}
