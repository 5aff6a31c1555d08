//! hronir_core — Identity & hashing, the hrönir/path/vote/transaction data
//! model, and the engine error taxonomy.
//!
//! This crate is **I/O-free**: it defines stable types/functions used across
//! the engine (`hronir_store`, `hronir_rating`, `hronir_engine`, `hronir_cli`).
//!
//! - Content-addressed identity: `hronir_id`, `path_id` (UUIDv5 over the DNS
//!   namespace), `mandate_id` (BLAKE3), canonical-JSON SHA-256 content hashes.
//! - Data model: `Hronir`, `Path`, `Vote`, `Transaction`, `Verdict`.
//! - Voting power: `⌈√N⌉`.
//! - `EngineError`: the complete error taxonomy.

#![forbid(unsafe_code)]

pub mod canonical_json;
pub mod error;
pub mod ids;
pub mod model;
pub mod voting_power;

pub use error::{EngineError, EngineResult, InvalidEdgeReason, MandateError, NotFoundKind};
pub use model::*;

/// Empty-predecessor sentinel used at narrative position 0.
pub fn nil_predecessor() -> uuid::Uuid {
    uuid::Uuid::nil()
}
