//! hronir_rating — the rating engine: Elo update, cohort
//! ranking, qualification evaluation, and maximum-entropy duel selection.
//!
//! Every function here is pure: no storage, no clock, no randomness. Callers
//! in `hronir_engine` fetch a cohort from `hronir_store`, run it through
//! these functions, and persist whatever changed.

#![forbid(unsafe_code)]

pub mod duel;
pub mod elo;
pub mod qualification;
pub mod ranking;
