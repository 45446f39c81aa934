//! Warehouse query executor.
//!
//! The chatbot treats the warehouse as an opaque capability: `query(sql)`
//! returning rows of scalar values. The shipped implementation reads a local
//! SQLite snapshot of the warehouse schema; tests substitute mocks.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A fetched row: column name to scalar value, in stable column order.
pub type Row = BTreeMap<String, Value>;

/// Opaque relational query capability.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute a read query and return its rows.
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;
}

/// Warehouse executor over a local SQLite snapshot.
#[derive(Clone)]
pub struct SqliteWarehouse {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWarehouse {
    /// Open the warehouse snapshot at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open warehouse database {}", db_path.display()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Wrap an existing connection (used by tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl Warehouse for SqliteWarehouse {
    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let mut stmt = conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare query: {}", sql))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, column) in columns.iter().enumerate() {
                record.insert(column.clone(), to_json(row.get_ref(idx)?));
            }
            out.push(record);
        }

        Ok(out)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        // Warehouse tables hold scalars; blobs have no textual rendering
        ValueRef::Blob(_) => Value::Null,
    }
}
