//! crates/hronir_store/src/store.rs
//! The durable shared resource: a single SQLite database file,
//! opened in WAL mode with foreign keys enforced. All engine-mutating
//! operations serialize through the one guarded connection; this is the
//! literal "single logical writer" the protocol calls for.
//!
//! Implementation note: reads and writes both take the same mutex. The spec
//! allows reads to proceed concurrently with each other; we resolved that as
//! an open engineering tradeoff in favor of one connection and strict
//! serialization rather than a second, independently-opened reader
//! connection, because a second connection against a `:memory:` database
//! would not see the writer's data at all (SQLite's in-memory databases are
//! connection-local) and this engine's correctness properties matter far
//! more than read/write overlap for an embedded, low-contention workload.
//! See `DESIGN.md` for the full rationale.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::schema;

/// Errors opening or initializing the store. Kept separate from
/// `hronir_core::EngineError` so this crate has no dependency on how its
/// callers choose to report storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The embedded object store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (creating if needed) a database file on disk.
    pub fn open_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private, process-local in-memory database. Useful for tests
    /// and ephemeral admin-CLI dry runs.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        schema::apply(&conn)?;
        Ok(Store {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the single writer/reader connection for the duration of one
    /// logical operation. Callers wrap their work in a SQLite transaction
    /// (see `hronir_engine`'s use of `Connection::transaction`).
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }
}
