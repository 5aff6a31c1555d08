//! crates/hronir_core/src/model.rs
//! The data model: Hrönir, Path, Vote, Transaction. Plain structs;
//! persistence lives in `hronir_store`, business rules in `hronir_engine`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable text artifact. Identity is fully determined by content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hronir {
    pub id: Uuid,
    pub text: String,
    /// RFC3339 UTC timestamp string.
    pub created_at: String,
}

/// Lifecycle state of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    Pending,
    Qualified,
    Spent,
}

impl PathStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStatus::Pending => "pending",
            PathStatus::Qualified => "qualified",
            PathStatus::Spent => "spent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PathStatus::Pending),
            "qualified" => Some(PathStatus::Qualified),
            "spent" => Some(PathStatus::Spent),
            _ => None,
        }
    }
}

/// A directed narrative edge asserting `current` succeeds `predecessor` at
/// `position`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub path_uuid: Uuid,
    pub position: u64,
    /// `Uuid::nil()` at position 0; a real hrönir id otherwise.
    pub predecessor: Uuid,
    pub current: Uuid,
    pub status: PathStatus,
    pub mandate_id: Option<[u8; 16]>,
    pub is_canonical: bool,
    pub elo_rating: f64,
    pub created_at: String,
}

impl Path {
    pub const INITIAL_ELO: f64 = 1500.0;
}

/// Which side of a duel a vote favored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChosenSide {
    A,
    B,
}

impl ChosenSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChosenSide::A => "A",
            ChosenSide::B => "B",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(ChosenSide::A),
            "B" => Some(ChosenSide::B),
            _ => None,
        }
    }
}

/// A verdict: within the duel at `target_position`, `winner_path` beat
/// `loser_path`. Caller-facing input to `cast_vote`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub target_position: u64,
    pub winner_path: Uuid,
    pub loser_path: Uuid,
}

/// A persisted verdict row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub vote_id: Uuid,
    pub position: u64,
    pub voting_token: Uuid,
    pub path_a: Uuid,
    pub path_b: Uuid,
    pub chosen_side: ChosenSide,
    pub tx_id: Uuid,
    pub created_at: String,
}

/// An atomic, append-only ledger record bundling 1..k votes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: Uuid,
    pub sequence: i64,
    pub prev_sequence: i64,
    pub prev_tx_hash: [u8; 32],
    pub voting_token: Uuid,
    pub content_hash: [u8; 32],
    pub created_at: String,
}

/// The canonical-bytes basis for `content_hash`: identical to `Transaction`
/// minus the `content_hash` field itself, plus the vote ids that transaction bundled (votes
/// are part of what the transaction attests to, so they are part of its
/// content basis).
#[derive(Clone, Debug, Serialize)]
pub struct TransactionContentBasis<'a> {
    pub sequence: i64,
    pub prev_sequence: i64,
    pub prev_tx_hash: String,
    pub voting_token: Uuid,
    pub vote_ids: &'a [Uuid],
    pub created_at: &'a str,
}

/// A ranked entry as returned by `get_ranking`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub path_uuid: Uuid,
    pub elo: f64,
    pub status: PathStatus,
}

/// The active duel for a `(position, predecessor)` cohort.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Duel {
    pub position: u64,
    pub predecessor: Uuid,
    pub path_a: Uuid,
    pub path_b: Uuid,
    pub entropy: f64,
}

/// `path_status` query result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStatusView {
    pub status: PathStatus,
    pub position: u64,
    pub elo: f64,
    pub mandate_id: Option<[u8; 16]>,
    pub is_canonical: bool,
}

/// One entry of `get_canonical_path`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub position: u64,
    pub path_uuid: Uuid,
    pub hronir_id: Uuid,
}

/// One finding from `audit()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrityIssue {
    pub code: &'static str,
    pub detail: String,
}
