//! crates/hronir_rating/src/duel.rs
//! Maximum-entropy duel selection: among candidate paths
//! (PENDING or QUALIFIED, never SPENT) in a cohort, pick the unordered pair
//! maximizing Shannon entropy of the logistic Elo model — equivalently, the
//! pair with the smallest `|R_A - R_B|`.

use hronir_core::model::{Path, PathStatus};
use uuid::Uuid;

/// `p = 1 / (1 + 10^((R_B - R_A) / 400))`, the logistic win probability of
/// `rating_a` over `rating_b`.
fn win_probability(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// `H(p) = -p*log2(p) - (1-p)*log2(1-p)`.
fn shannon_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -(p * p.log2()) - ((1.0 - p) * (1.0 - p).log2())
}

/// One candidate pairing considered by `select_max_entropy`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub path_a: Uuid,
    pub path_b: Uuid,
    pub entropy: f64,
    pub elo_gap: f64,
}

/// Pick the highest-entropy unordered pair among eligible (PENDING or
/// QUALIFIED) paths in `cohort`. Returns `None` if fewer than two are
/// eligible. Ties break on the smallest `|R_A - R_B|` (structurally
/// equivalent to maximizing entropy, since entropy is monotone decreasing in
/// the gap), then lexicographically smallest `(path_a, path_b)` pair.
pub fn select_max_entropy(cohort: &[Path]) -> Option<Candidate> {
    let mut eligible: Vec<&Path> = cohort
        .iter()
        .filter(|p| matches!(p.status, PathStatus::Pending | PathStatus::Qualified))
        .collect();
    if eligible.len() < 2 {
        return None;
    }
    // Sort for a stable, deterministic scan order independent of storage order.
    eligible.sort_by(|a, b| a.path_uuid.cmp(&b.path_uuid));

    let mut best: Option<Candidate> = None;
    for i in 0..eligible.len() {
        for j in (i + 1)..eligible.len() {
            let (pa, pb) = (eligible[i], eligible[j]);
            let (first, second) = if pa.path_uuid <= pb.path_uuid { (pa, pb) } else { (pb, pa) };
            let gap = (first.elo_rating - second.elo_rating).abs();
            let p = win_probability(first.elo_rating, second.elo_rating);
            let entropy = shannon_entropy(p);
            let candidate = Candidate {
                path_a: first.path_uuid,
                path_b: second.path_uuid,
                entropy,
                elo_gap: gap,
            };
            best = Some(match best {
                None => candidate,
                Some(current) => {
                    if gap < current.elo_gap
                        || (gap == current.elo_gap
                            && (candidate.path_a, candidate.path_b) < (current.path_a, current.path_b))
                    {
                        candidate
                    } else {
                        current
                    }
                }
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn fewer_than_two_eligible_yields_no_duel() {
        let cohort = vec![path(1, 1500.0, PathStatus::Pending), path(2, 1500.0, PathStatus::Spent)];
        assert!(select_max_entropy(&cohort).is_none());
    }

    #[test]
    fn picks_the_closest_elo_pair() {
        let cohort = vec![
            path(1, 1400.0, PathStatus::Pending),
            path(2, 1490.0, PathStatus::Pending),
            path(3, 1500.0, PathStatus::Qualified),
        ];
        let duel = select_max_entropy(&cohort).unwrap();
        assert_eq!(duel.path_a, Uuid::from_bytes([2; 16]));
        assert_eq!(duel.path_b, Uuid::from_bytes([3; 16]));
    }

    #[test]
    fn equal_ratings_maximize_entropy_at_exactly_one_bit() {
        let cohort = vec![path(1, 1500.0, PathStatus::Pending), path(2, 1500.0, PathStatus::Pending)];
        let duel = select_max_entropy(&cohort).unwrap();
        assert!((duel.entropy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ties_on_gap_break_lexicographically() {
        let cohort = vec![
            path(3, 1400.0, PathStatus::Pending),
            path(1, 1500.0, PathStatus::Pending),
            path(2, 1500.0, PathStatus::Pending),
        ];
        // paths 1 and 2 tie at gap 0; path 3 is 100 away from both.
        let duel = select_max_entropy(&cohort).unwrap();
        assert_eq!(duel.path_a, Uuid::from_bytes([1; 16]));
        assert_eq!(duel.path_b, Uuid::from_bytes([2; 16]));
    }
}
