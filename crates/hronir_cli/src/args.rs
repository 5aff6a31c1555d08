// crates/hronir_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing for the admin/ops front end.
// One subcommand per external-interface operation; no narrative
// authoring surface lives here.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "hronir", about = "Admin/ops CLI over the hrönir protocol engine")]
pub struct Args {
    /// Path to the SQLite database file. Created on first use.
    #[arg(long, global = true)]
    pub db: PathBuf,

    /// Elo K-factor override.
    #[arg(long, global = true)]
    pub elo_k: Option<f64>,
    /// Minimum vote-participation count before qualification (default 1).
    #[arg(long, global = true)]
    pub min_votes: Option<u64>,
    /// Qualification margin above the cohort median (default 0.0).
    #[arg(long, global = true)]
    pub delta: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// `store_hronir(text) -> (hronir_id, created)`
    Store {
        /// Literal text, or `@path` to read text from a file.
        text: String,
        /// RFC3339 timestamp to stamp on the record.
        #[arg(long)]
        at: String,
    },
    /// `register_path(position, predecessor?, current) -> path_uuid`
    RegisterPath {
        #[arg(long)]
        position: u64,
        #[arg(long)]
        predecessor: Option<Uuid>,
        #[arg(long)]
        current: Uuid,
        #[arg(long)]
        at: String,
    },
    /// `get_ranking(position, predecessor) -> [...]`
    Rank {
        #[arg(long)]
        position: u64,
        #[arg(long, default_value = "00000000-0000-0000-0000-000000000000")]
        predecessor: Uuid,
    },
    /// `get_duel(position) -> {...} | none`
    Duel {
        #[arg(long)]
        position: u64,
    },
    /// `path_status(path_uuid) -> {...}`
    Status {
        #[arg(long)]
        path: Uuid,
    },
    /// `cast_vote(voting_token, verdicts) -> tx_id`. One `--verdict
    /// position:winner:loser` flag per verdict (repeatable).
    Vote {
        #[arg(long)]
        token: Uuid,
        #[arg(long = "verdict", value_parser = parse_verdict)]
        verdicts: Vec<hronir_core::model::Verdict>,
        #[arg(long)]
        at: String,
    },
    /// `get_canonical_path() -> [...]`
    Canon,
    /// `recover_canon()` — run `cascade(0)`.
    RecoverCanon,
    /// `audit() -> [integrity issues]`
    Audit,
    /// Debug canonical-JSON dump of every table (not a signed snapshot manifest).
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_verdict(s: &str) -> Result<hronir_core::model::Verdict, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected `position:winner_path:loser_path`, got `{s}`"));
    }
    let target_position: u64 = parts[0].parse().map_err(|e| format!("bad position: {e}"))?;
    let winner_path: Uuid = parts[1].parse().map_err(|e| format!("bad winner_path: {e}"))?;
    let loser_path: Uuid = parts[2].parse().map_err(|e| format!("bad loser_path: {e}"))?;
    Ok(hronir_core::model::Verdict {
        target_position,
        winner_path,
        loser_path,
    })
}

pub fn parse() -> Args {
    Args::parse()
}
