//! hronir_engine — the orchestration facade exposing the protocol's external
//! interface over `hronir_store` and `hronir_rating`.
//!
//! Every mutating method here takes its `created_at` timestamp as an
//! explicit caller-supplied parameter rather than reading the wall clock —
//! no process-wide mutable state, explicit parameters only — which also
//! keeps the engine trivially replayable in tests.

#![forbid(unsafe_code)]

pub mod cascade;
pub mod config;
pub mod graph;
pub mod ledger;
pub mod mandate;
pub mod vote;

use std::sync::atomic::{AtomicBool, Ordering};

use hronir_core::error::{storage_error, EngineError, InvalidEdgeReason, NotFoundKind};
use hronir_core::ids::{hronir_id, path_id, normalize_text};
use hronir_core::model::{
    CanonicalEntry, Duel, Hronir, IntegrityIssue, Path, PathStatus, PathStatusView, RankingEntry, Verdict,
};
use hronir_store::dao;
use hronir_store::Store;
use uuid::Uuid;

pub use config::EngineConfig;

/// The facade type. Holds a `Store` (cheaply `Clone`-able, `Arc`-backed) and
/// the tunables in `EngineConfig`, plus the integrity lock.
pub struct Engine {
    store: Store,
    config: EngineConfig,
    read_only: AtomicBool,
}

impl Engine {
    pub fn new(store: Store, config: EngineConfig) -> Self {
        Engine {
            store,
            config,
            read_only: AtomicBool::new(false),
        }
    }

    pub fn with_defaults(store: Store) -> Self {
        Self::new(store, EngineConfig::default())
    }

    fn check_writable(&self) -> Result<(), EngineError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(EngineError::Integrity(
                "engine is in read-only mode after a detected integrity failure".to_string(),
            ));
        }
        Ok(())
    }

    /// Manually clear the integrity lock after an operator has repaired the
    /// store out of band. Never called automatically.
    pub fn clear_integrity_lock_after_repair(&self) {
        self.read_only.store(false, Ordering::SeqCst);
        tracing::warn!("integrity lock cleared manually");
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// `store_hronir(text) -> (hronir_id, created)`. Idempotent:
    /// re-storing identical text returns the same id with `created = false`.
    pub fn store_hronir(&self, text: &str, created_at: &str) -> Result<(Uuid, bool), EngineError> {
        self.check_writable()?;
        let mut guard = self.store.lock();
        let tx = guard.transaction().map_err(storage_error)?;

        let id = hronir_id(text);
        if dao::hronir_exists(&tx, id).map_err(storage_error)? {
            tx.commit().map_err(storage_error)?;
            tracing::debug!(hronir_id = %id, "store_hronir: already exists");
            return Ok((id, false));
        }

        let hronir = Hronir {
            id,
            text: normalize_text(text),
            created_at: created_at.to_string(),
        };
        dao::insert_hronir(&tx, &hronir).map_err(storage_error)?;
        tx.commit().map_err(storage_error)?;
        tracing::info!(hronir_id = %id, "store_hronir: created");
        Ok((id, true))
    }

    /// `register_path(position, predecessor?, current) -> path_uuid`.
    /// Idempotent on the derived id; validates the four graph invariants
    /// first.
    pub fn register_path(
        &self,
        position: u64,
        predecessor: Option<Uuid>,
        current: Uuid,
        created_at: &str,
    ) -> Result<Uuid, EngineError> {
        self.check_writable()?;
        let predecessor = predecessor.unwrap_or_else(Uuid::nil);
        let mut guard = self.store.lock();
        let tx = guard.transaction().map_err(storage_error)?;

        let derived_id = path_id(position, predecessor, current);
        if let Some(existing) = dao::get_path(&tx, derived_id).map_err(storage_error)? {
            tx.commit().map_err(storage_error)?;
            tracing::debug!(path_uuid = %existing.path_uuid, "register_path: already exists");
            return Ok(existing.path_uuid);
        }

        graph::validate_edge(&tx, position, predecessor, current).map_err(EngineError::InvalidEdge)?;

        let path = Path {
            path_uuid: derived_id,
            position,
            predecessor,
            current,
            status: PathStatus::Pending,
            mandate_id: None,
            is_canonical: false,
            elo_rating: Path::INITIAL_ELO,
            created_at: created_at.to_string(),
        };
        dao::insert_path(&tx, &path).map_err(storage_error)?;
        // A new edge can change which path is canonical at its own position
        // (most notably the very first edge at position 0, which has no
        // vote to trigger a cascade otherwise) and, transitively, every
        // position after it.
        cascade::cascade(&tx, position)?;
        tx.commit().map_err(storage_error)?;
        tracing::info!(path_uuid = %derived_id, position, "register_path: created");
        Ok(derived_id)
    }

    /// `get_ranking(position, predecessor) -> [(path_uuid, elo, status), ...]`.
    pub fn get_ranking(&self, position: u64, predecessor: Uuid) -> Result<Vec<RankingEntry>, EngineError> {
        let guard = self.store.lock();
        let cohort = dao::list_cohort(&guard, position, predecessor).map_err(storage_error)?;
        Ok(hronir_rating::ranking::rank(&cohort))
    }

    /// `get_duel(position) -> {predecessor, path_A, path_B, entropy} | none`.
    /// Uses the *canonical* predecessor context at `position`.
    pub fn get_duel(&self, position: u64) -> Result<Option<Duel>, EngineError> {
        let guard = self.store.lock();
        let predecessor = if position == 0 {
            Uuid::nil()
        } else {
            match dao::get_canonical_at_position(&guard, position - 1).map_err(storage_error)? {
                Some(p) => p.current,
                None => return Ok(None),
            }
        };
        let cohort = dao::list_cohort(&guard, position, predecessor).map_err(storage_error)?;
        let candidate = hronir_rating::duel::select_max_entropy(&cohort);
        Ok(candidate.map(|c| Duel {
            position,
            predecessor,
            path_a: c.path_a,
            path_b: c.path_b,
            entropy: c.entropy,
        }))
    }

    /// `path_status(path_uuid) -> {status, position, elo, mandate_id?, is_canonical}`.
    pub fn path_status(&self, path_uuid: Uuid) -> Result<PathStatusView, EngineError> {
        let guard = self.store.lock();
        let path = dao::get_path(&guard, path_uuid)
            .map_err(storage_error)?
            .ok_or(EngineError::NotFound(NotFoundKind::Path(path_uuid)))?;
        Ok(PathStatusView {
            status: path.status,
            position: path.position,
            elo: path.elo_rating,
            mandate_id: path.mandate_id,
            is_canonical: path.is_canonical,
        })
    }

    /// Force a path straight to QUALIFIED, bypassing the normal
    /// vote-driven qualification evaluation in `hronir_rating::qualification`.
    /// Not part of the protocol surface; it exists solely for test harnesses
    /// and migration scripts that need to seed a mandate without running
    /// real duels first.
    pub fn test_force_qualify(&self, path_uuid: Uuid) -> Result<(), EngineError> {
        self.check_writable()?;
        let guard = self.store.lock();
        dao::get_path(&guard, path_uuid)
            .map_err(storage_error)?
            .ok_or(EngineError::NotFound(NotFoundKind::Path(path_uuid)))?;
        dao::update_path_status(&guard, path_uuid, PathStatus::Qualified).map_err(storage_error)?;
        Ok(())
    }

    /// `cast_vote(voting_token, verdicts) -> tx_id`.
    pub fn cast_vote(&self, voting_token: Uuid, verdicts: &[Verdict], created_at: &str) -> Result<Uuid, EngineError> {
        self.check_writable()?;
        let mut guard = self.store.lock();
        let tx = guard.transaction().map_err(storage_error)?;

        let result = vote::cast_vote(&tx, &self.config, voting_token, verdicts, created_at);
        match result {
            Ok(committed) => {
                let expected = committed.prev_sequence + 1;
                if let Err(e) = tx.commit() {
                    let observed = dao::get_max_sequence(&guard).ok().flatten().unwrap_or(expected);
                    return Err(commit_error(e, expected, observed));
                }
                tracing::info!(tx_id = %committed.tx_id, voting_token = %voting_token, "cast_vote: committed");
                Ok(committed.tx_id)
            }
            Err(err) => {
                tracing::warn!(error = %err, voting_token = %voting_token, "cast_vote: rejected");
                Err(err)
            }
        }
    }

    /// `get_canonical_path() -> [(position, path_uuid, hronir_id), ...]`.
    pub fn get_canonical_path(&self) -> Result<Vec<CanonicalEntry>, EngineError> {
        let guard = self.store.lock();
        let paths = dao::list_canonical_path(&guard).map_err(storage_error)?;
        Ok(paths
            .into_iter()
            .map(|p| CanonicalEntry {
                position: p.position,
                path_uuid: p.path_uuid,
                hronir_id: p.current,
            })
            .collect())
    }

    /// `recover_canon()` — run `cascade(0)`. Runs `verify_chain`
    /// first; a broken ledger trips the integrity lock instead of cascading
    /// over untrustworthy state.
    pub fn recover_canon(&self) -> Result<(), EngineError> {
        self.check_writable()?;
        let mut guard = self.store.lock();
        let tx = guard.transaction().map_err(storage_error)?;

        if let Err(e) = ledger::verify_chain(&tx) {
            self.read_only.store(true, Ordering::SeqCst);
            tracing::error!(error = %e, "recover_canon: ledger integrity check failed, engine is now read-only");
            return Err(e);
        }

        cascade::cascade(&tx, 0)?;
        tx.commit().map_err(storage_error)?;
        tracing::info!("recover_canon: cascade(0) completed");
        Ok(())
    }

    /// `audit() -> [integrity issues]`.
    pub fn audit(&self) -> Result<Vec<IntegrityIssue>, EngineError> {
        let guard = self.store.lock();
        let mut issues = Vec::new();

        if let Err(e) = ledger::verify_chain(&guard) {
            issues.push(IntegrityIssue {
                code: "ledger_chain_broken",
                detail: e.to_string(),
            });
        }

        for hronir in dao::list_all_hronirs(&guard).map_err(storage_error)? {
            if hronir_id(&hronir.text) != hronir.id {
                issues.push(IntegrityIssue {
                    code: "hronir_id_mismatch",
                    detail: format!("hrönir {} does not hash to its own id", hronir.id),
                });
            }
        }

        for path in dao::list_all_paths(&guard).map_err(storage_error)? {
            if path_id(path.position, path.predecessor, path.current) != path.path_uuid {
                issues.push(IntegrityIssue {
                    code: "path_id_mismatch",
                    detail: format!("path {} does not hash to its own id", path.path_uuid),
                });
            }
        }

        if let Err(InvalidEdgeReason::WouldCycle) = detect_any_cycle(&guard) {
            issues.push(IntegrityIssue {
                code: "graph_cycle_detected",
                detail: "the narrative graph contains a cycle".to_string(),
            });
        }

        let mut by_position: std::collections::HashMap<u64, Vec<Uuid>> = std::collections::HashMap::new();
        for path in dao::list_all_paths(&guard).map_err(storage_error)? {
            if path.is_canonical {
                by_position.entry(path.position).or_default().push(path.path_uuid);
            }
        }
        for (position, paths) in by_position {
            if paths.len() > 1 {
                issues.push(IntegrityIssue {
                    code: "duplicate_canonical_at_position",
                    detail: format!("position {position} has {} canonical paths", paths.len()),
                });
            }
        }

        Ok(issues)
    }

    /// A debug canonical-JSON dump of every table.
    pub fn export_snapshot_bytes(&self) -> Result<Vec<u8>, EngineError> {
        let guard = self.store.lock();
        let hronirs = dao::list_all_hronirs(&guard).map_err(storage_error)?;
        let paths = dao::list_all_paths(&guard).map_err(storage_error)?;
        let votes = dao::list_all_votes(&guard).map_err(storage_error)?;
        let transactions = dao::list_all_transactions_ordered(&guard).map_err(storage_error)?;

        #[derive(serde::Serialize)]
        struct Snapshot {
            hronirs: Vec<Hronir>,
            paths: Vec<Path>,
            votes: Vec<hronir_core::model::Vote>,
            transactions: Vec<hronir_core::model::Transaction>,
        }

        let snapshot = Snapshot {
            hronirs,
            paths,
            votes,
            transactions,
        };
        hronir_core::canonical_json::to_canonical_bytes(&snapshot)
            .map_err(|e| EngineError::Integrity(format!("failed to encode snapshot: {e}")))
    }
}

/// Map a failed `COMMIT` to `ErrConflict` when SQLite reports the database
/// busy or locked — the signature of a second OS process's writer
/// transaction racing this one against the same on-disk file (the in-process
/// `Store` mutex already rules out same-process races; see `hronir_store::Store`).
/// Any other commit failure is a plain storage error.
fn commit_error(e: rusqlite::Error, expected: i64, observed: i64) -> EngineError {
    use rusqlite::ErrorCode;
    let busy = matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    );
    if busy {
        EngineError::Conflict { expected, observed }
    } else {
        storage_error(e)
    }
}

/// Whole-graph cycle check used by `audit()` (distinct from `graph::validate_edge`'s
/// single-proposed-edge check, which runs before an edge is even inserted).
fn detect_any_cycle(conn: &rusqlite::Connection) -> Result<(), InvalidEdgeReason> {
    let edges = dao::list_all_edges(conn).unwrap_or_default();
    let mut adjacency: std::collections::HashMap<Uuid, Vec<Uuid>> = std::collections::HashMap::new();
    let mut nodes: std::collections::HashSet<Uuid> = std::collections::HashSet::new();
    for (pred, cur) in &edges {
        adjacency.entry(*pred).or_default().push(*cur);
        nodes.insert(*pred);
        nodes.insert(*cur);
    }

    let mut state: std::collections::HashMap<Uuid, u8> = std::collections::HashMap::new(); // 0=unvisited,1=in-progress,2=done
    for &start in &nodes {
        if state.get(&start).copied().unwrap_or(0) != 0 {
            continue;
        }
        if dfs_has_cycle(start, &adjacency, &mut state) {
            return Err(InvalidEdgeReason::WouldCycle);
        }
    }
    Ok(())
}

fn dfs_has_cycle(
    node: Uuid,
    adjacency: &std::collections::HashMap<Uuid, Vec<Uuid>>,
    state: &mut std::collections::HashMap<Uuid, u8>,
) -> bool {
    state.insert(node, 1);
    if let Some(neighbors) = adjacency.get(&node) {
        for &next in neighbors {
            match state.get(&next).copied().unwrap_or(0) {
                0 => {
                    if dfs_has_cycle(next, adjacency, state) {
                        return true;
                    }
                }
                1 => return true,
                _ => {}
            }
        }
    }
    state.insert(node, 2);
    false
}
