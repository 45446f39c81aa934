//! Portal database bootstrap.
//!
//! Users and roles share one SQLite file. The connection is wrapped in a
//! mutex and cloned into the stores; SQLite serializes writes anyway, so a
//! single guarded connection keeps things simple.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Shared portal database handle.
pub type Db = Arc<Mutex<Connection>>;

/// Open (and if needed create) the portal database at the given path.
pub fn open(db_path: &Path) -> Result<Db> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open portal database {}", db_path.display()))?;

    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS roles (
            id TEXT PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            role_id TEXT NOT NULL REFERENCES roles(id),
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        CREATE INDEX IF NOT EXISTS idx_users_role ON users(role_id);
        ",
    )?;

    Ok(Arc::new(Mutex::new(conn)))
}
