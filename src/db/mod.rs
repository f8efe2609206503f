//! Storage layer.
//!
//! Commands talk to a [`TemplateStore`]. Two backends exist:
//! - [`PgStore`]: the production PostgreSQL database (one connection).
//! - [`Database`]: a SQLite mirror, opened from a file or in memory.

pub mod postgres;
pub mod sequence;
pub mod store;
pub mod templates;

pub use postgres::PgStore;
pub use sequence::{SequenceRepair, SequenceState, plan_sequence_repair};
pub use store::{TemplateStore, validate_identifier};

use crate::config::{Backend, DatabaseConfig};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Tables of the local mirror, created when missing.
const SQLITE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT,
    subcategory TEXT,
    prompt_template TEXT NOT NULL DEFAULT '',
    inputs TEXT NOT NULL DEFAULT '[]',
    updated_at TEXT
);
CREATE TABLE IF NOT EXISTS saved_prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id INTEGER,
    content TEXT,
    created_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_templates_name ON templates(name);
";

/// SQLite database handle.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the mirror at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;

        conn.execute_batch("PRAGMA busy_timeout=5000;")?;
        Self::init(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SQLITE_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("SQLite connection mutex poisoned"))?;
        f(&conn)
    }
}

/// Open the store selected by configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn TemplateStore>> {
    info!(backend = config.backend.as_str(), db = %config.describe(), "Connecting");
    match config.backend {
        Backend::Postgres => Ok(Box::new(PgStore::connect(config).await?)),
        Backend::Sqlite => Ok(Box::new(Database::open(&config.sqlite_path)?)),
    }
}

/// Current UTC time.
pub fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
