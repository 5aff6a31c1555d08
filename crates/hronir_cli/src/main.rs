// crates/hronir_cli/src/main.rs
//
// hronir — admin/ops CLI entrypoint. Deterministic, offline, single-binary
// driver over `hronir_engine`. Not the narrative front end (out of scope);
// this exists purely as an operator surface and a way to exercise the
// library end to end.

mod args;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use args::Command;
use hronir_engine::{Engine, EngineConfig};
use hronir_store::Store;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hronir: error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = args::parse();

    let store = Store::open_file(&args.db).with_context(|| format!("opening database at {}", args.db.display()))?;
    let mut config = EngineConfig::default();
    if let Some(elo_k) = args.elo_k {
        config.elo_k = elo_k;
    }
    if let Some(min_votes) = args.min_votes {
        config.min_votes = min_votes;
    }
    if let Some(delta) = args.delta {
        config.delta = delta;
    }
    let engine = Engine::new(store, config);

    match args.command {
        Command::Store { text, at } => {
            let text = resolve_text_arg(&text)?;
            let (id, created) = engine.store_hronir(&text, &at)?;
            println!("{{\"hronir_id\":\"{id}\",\"created\":{created}}}");
        }
        Command::RegisterPath {
            position,
            predecessor,
            current,
            at,
        } => {
            let path_uuid = engine.register_path(position, predecessor, current, &at)?;
            println!("{{\"path_uuid\":\"{path_uuid}\"}}");
        }
        Command::Rank { position, predecessor } => {
            let ranking = engine.get_ranking(position, predecessor)?;
            println!("{}", serde_json::to_string(&ranking)?);
        }
        Command::Duel { position } => {
            let duel = engine.get_duel(position)?;
            println!("{}", serde_json::to_string(&duel)?);
        }
        Command::Status { path } => {
            let status = engine.path_status(path)?;
            println!("{}", serde_json::to_string(&status)?);
        }
        Command::Vote { token, verdicts, at } => {
            let tx_id = engine.cast_vote(token, &verdicts, &at)?;
            println!("{{\"tx_id\":\"{tx_id}\"}}");
        }
        Command::Canon => {
            let canon = engine.get_canonical_path()?;
            println!("{}", serde_json::to_string(&canon)?);
        }
        Command::RecoverCanon => {
            engine.recover_canon()?;
            println!("{{\"recovered\":true}}");
        }
        Command::Audit => {
            let issues = engine.audit()?;
            println!("{}", serde_json::to_string(&issues)?);
        }
        Command::Export { out } => {
            let bytes = engine.export_snapshot_bytes()?;
            fs::write(&out, &bytes).with_context(|| format!("writing export to {}", out.display()))?;
        }
    }

    Ok(())
}

fn resolve_text_arg(text: &str) -> Result<String> {
    if let Some(path) = text.strip_prefix('@') {
        fs::read_to_string(path).with_context(|| format!("reading text from {path}"))
    } else {
        Ok(text.to_string())
    }
}
