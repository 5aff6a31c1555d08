//! crates/hronir_engine/src/config.rs
//! Engine-wide tunables. No config file
//! format is mandated; `hronir_cli` exposes these as flags.

/// Tunable parameters governing Elo updates and qualification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Elo K-factor.
    pub elo_k: f64,
    /// Minimum recorded vote participations before a path is eligible for
    /// qualification.
    pub min_votes: u64,
    /// Margin a path's Elo must clear above the cohort median to qualify.
    pub delta: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            elo_k: hronir_rating::elo::DEFAULT_K,
            min_votes: hronir_rating::qualification::DEFAULT_MIN_VOTES,
            delta: hronir_rating::qualification::DEFAULT_DELTA,
        }
    }
}
