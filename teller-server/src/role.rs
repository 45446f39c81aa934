//! Role storage for the Teller portal.
//!
//! Roles are plain named records; the permission model attached to a name
//! lives in `teller_common::rbac`. The built-in `admin` and `user` roles are
//! seeded on first startup.

use crate::db::Db;
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use teller_common::rbac::ADMIN_ROLE;
use uuid::Uuid;

/// Role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// Role store backed by the shared portal database.
#[derive(Clone)]
pub struct RoleStore {
    db: Db,
}

impl RoleStore {
    /// Create a role store and seed the built-in roles if the table is empty.
    pub fn new(db: Db) -> Result<Self> {
        let store = Self { db };

        if store.count()? == 0 {
            tracing::info!("Seeding built-in roles");
            store.create(ADMIN_ROLE)?;
            store.create("user")?;
        }

        Ok(store)
    }

    /// Create a new role.
    pub fn create(&self, name: &str) -> Result<Role> {
        if name.is_empty() {
            anyhow::bail!("Role name cannot be empty");
        }

        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let id = Uuid::new_v4().to_string();
        db.execute(
            "INSERT INTO roles (id, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .with_context(|| format!("Failed to create role '{}'", name))?;

        Ok(Role {
            id,
            name: name.to_string(),
        })
    }

    /// Get a role by ID.
    pub fn get(&self, id: &str) -> Result<Option<Role>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        db.query_row(
            "SELECT id, name FROM roles WHERE id = ?1",
            params![id],
            |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("Failed to get role {}", id))
    }

    /// Get a role by name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Role>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        db.query_row(
            "SELECT id, name FROM roles WHERE name = ?1",
            params![name],
            |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("Failed to get role '{}'", name))
    }

    /// List all roles sorted by name.
    pub fn list(&self) -> Result<Vec<Role>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let mut stmt = db.prepare("SELECT id, name FROM roles ORDER BY name ASC")?;
        let roles = stmt
            .query_map([], |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    /// Rename a role. Returns the updated role, or `None` if it doesn't exist.
    pub fn rename(&self, id: &str, name: &str) -> Result<Option<Role>> {
        if name.is_empty() {
            anyhow::bail!("Role name cannot be empty");
        }

        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let rows = db
            .execute(
                "UPDATE roles SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .with_context(|| format!("Failed to rename role {}", id))?;

        if rows == 0 {
            return Ok(None);
        }

        Ok(Some(Role {
            id: id.to_string(),
            name: name.to_string(),
        }))
    }

    /// Delete a role. Returns `true` if a row was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let rows = db.execute("DELETE FROM roles WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Count users currently assigned to a role.
    pub fn user_count(&self, role_id: &str) -> Result<u64> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let count: i64 = db.query_row(
            "SELECT COUNT(*) FROM users WHERE role_id = ?1",
            params![role_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Count total roles.
    pub fn count(&self) -> Result<u64> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let count: i64 = db.query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
