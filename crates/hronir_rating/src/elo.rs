//! crates/hronir_rating/src/elo.rs
//! The Elo update: `E_A = 1 / (1 + 10^((R_B - R_A) / 400))`,
//! `R_A' = R_A + K * (S_A - E_A)`.

/// Default K-factor.
pub const DEFAULT_K: f64 = 32.0;

/// Expected score of `rating_a` against `rating_b`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// New `(winner_rating, loser_rating)` after one duel.
pub fn update(winner: f64, loser: f64, k: f64) -> (f64, f64) {
    let e_winner = expected_score(winner, loser);
    let e_loser = expected_score(loser, winner);
    let new_winner = winner + k * (1.0 - e_winner);
    let new_loser = loser + k * (0.0 - e_loser);
    (new_winner, new_loser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings_give_half_expectation() {
        let e = expected_score(1500.0, 1500.0);
        assert!((e - 0.5).abs() < 1e-9);
    }

    #[test]
    fn winner_gains_loser_loses_equal_amounts_for_equal_ratings() {
        let (w, l) = update(1500.0, 1500.0, 32.0);
        assert!((w - 1516.0).abs() < 1e-9);
        assert!((l - 1484.0).abs() < 1e-9);
        // Zero-sum: total rating mass is conserved.
        assert!(((w + l) - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn upset_moves_ratings_more_than_an_expected_result() {
        let (w_upset, l_upset) = update(1400.0, 1600.0, 32.0);
        let (w_expected, l_expected) = update(1600.0, 1400.0, 32.0);
        assert!((w_upset - 1400.0).abs() > (w_expected - 1600.0).abs());
        assert!((1400.0 - l_upset).abs() < (1600.0 - l_expected).abs());
    }
}
