//! User storage for the Teller portal.
//!
//! Provides user records, password hashing, and CRUD operations. Every user
//! carries exactly one role; queries join the role in so API responses can
//! embed it.

use crate::db::Db;
use crate::role::{Role, RoleStore};
use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row as SqlRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: String,
    /// Username for login
    pub username: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Assigned role
    pub role: Role,
    /// Whether the user is enabled
    pub enabled: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Last login timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Request to create a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role_id: String,
}

/// Request to update an existing user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl UpdateUserRequest {
    /// True when the request carries no field to apply.
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.role_id.is_none() && self.enabled.is_none()
    }
}

const SELECT_USER: &str = r"
    SELECT u.id, u.username, u.password_hash, u.enabled,
           u.created_at, u.updated_at, u.last_login_at,
           r.id, r.name
    FROM users u
    JOIN roles r ON r.id = u.role_id
";

/// User store backed by the shared portal database.
#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a user store and seed a default admin user if no users exist.
    pub fn new(db: Db, roles: &RoleStore) -> Result<Self> {
        let store = Self { db };

        if store.count()? == 0 {
            let admin_role = roles
                .get_by_name("admin")?
                .context("admin role missing from role store")?;
            tracing::info!("Creating default admin user");
            store.create(&CreateUserRequest {
                username: "admin".to_string(),
                password: "admin123".to_string(), // Should be changed immediately!
                role_id: admin_role.id,
            })?;
        }

        Ok(store)
    }

    /// Create a new user.
    pub fn create(&self, request: &CreateUserRequest) -> Result<User> {
        if request.username.is_empty() {
            anyhow::bail!("Username cannot be empty");
        }
        if request.username.len() > 64 {
            anyhow::bail!("Username too long (max 64 characters)");
        }
        if request.password.len() < 8 {
            anyhow::bail!("Password must be at least 8 characters");
        }

        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let role = get_role(&db, &request.role_id)?
            .with_context(|| format!("Unknown role {}", request.role_id))?;

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        db.execute(
            r"
            INSERT INTO users (id, username, password_hash, role_id, enabled, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            ",
            params![id, request.username, password_hash, role.id, now.to_rfc3339()],
        )
        .with_context(|| format!("Failed to create user '{}'", request.username))?;

        Ok(User {
            id,
            username: request.username.clone(),
            password_hash,
            role,
            enabled: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }

    /// Get a user by ID.
    pub fn get(&self, id: &str) -> Result<Option<User>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        db.query_row(
            &format!("{SELECT_USER} WHERE u.id = ?1"),
            params![id],
            map_user,
        )
        .optional()
        .with_context(|| format!("Failed to get user {}", id))
    }

    /// Get a user by username.
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        db.query_row(
            &format!("{SELECT_USER} WHERE u.username = ?1"),
            params![username],
            map_user,
        )
        .optional()
        .with_context(|| format!("Failed to get user '{}'", username))
    }

    /// Update a user. Returns the updated user, or `None` if it doesn't exist.
    pub fn update(&self, id: &str, request: &UpdateUserRequest) -> Result<Option<User>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let exists: bool = db
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |_| {
                Ok(true)
            })
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Ok(None);
        }

        let now = Utc::now().to_rfc3339();

        if let Some(password) = &request.password {
            if password.len() < 8 {
                anyhow::bail!("Password must be at least 8 characters");
            }
            let hash = hash_password(password)?;
            db.execute(
                "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
                params![hash, now, id],
            )?;
        }

        if let Some(role_id) = &request.role_id {
            let role =
                get_role(&db, role_id)?.with_context(|| format!("Unknown role {}", role_id))?;
            db.execute(
                "UPDATE users SET role_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![role.id, now, id],
            )?;
        }

        if let Some(enabled) = request.enabled {
            db.execute(
                "UPDATE users SET enabled = ?1, updated_at = ?2 WHERE id = ?3",
                params![if enabled { 1 } else { 0 }, now, id],
            )?;
        }

        drop(db);
        self.get(id)
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let rows = db.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// List users ordered by creation time, newest first.
    pub fn list(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<User>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let limit = limit.unwrap_or(100).min(1000);
        let offset = offset.unwrap_or(0);

        let mut stmt = db.prepare(&format!(
            "{SELECT_USER} ORDER BY u.created_at DESC LIMIT ?1 OFFSET ?2"
        ))?;
        let users = stmt
            .query_map(params![limit, offset], map_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Count total users.
    pub fn count(&self) -> Result<u64> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        let count: i64 = db.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Verify a user's password and update the last login time.
    ///
    /// Returns `None` for unknown users, disabled users, and wrong passwords.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_by_username(username)? else {
            return Ok(None);
        };

        if !user.enabled {
            return Ok(None);
        }

        if !verify_password(password, &user.password_hash)? {
            return Ok(None);
        }

        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        db.execute(
            "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), user.id],
        )?;
        drop(db);

        self.get(&user.id)
    }
}

fn get_role(db: &Connection, role_id: &str) -> Result<Option<Role>> {
    db.query_row(
        "SELECT id, name FROM roles WHERE id = ?1",
        params![role_id],
        |row| {
            Ok(Role {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

fn map_user(row: &SqlRow<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    let last_login_at: Option<String> = row.get(6)?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        enabled: row.get::<_, i64>(3)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        last_login_at: last_login_at.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }),
        role: Role {
            id: row.get(7)?,
            name: row.get(8)?,
        },
    })
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_stores() -> (UserStore, RoleStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = crate::db::open(&dir.path().join("portal.db")).unwrap();
        let roles = RoleStore::new(db.clone()).unwrap();
        let users = UserStore::new(db, &roles).unwrap();
        (users, roles, dir)
    }

    fn staff_role(roles: &RoleStore) -> Role {
        roles.get_by_name("user").unwrap().unwrap()
    }

    #[test]
    fn test_default_admin_created() {
        let (users, _roles, _dir) = create_test_stores();

        let admin = users.get_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.role.name, "admin");
        assert!(admin.enabled);
    }

    #[test]
    fn test_create_user() {
        let (users, roles, _dir) = create_test_stores();

        let user = users
            .create(&CreateUserRequest {
                username: "clerk".to_string(),
                password: "password123".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        assert_eq!(user.username, "clerk");
        assert_eq!(user.role.name, "user");
        assert!(user.enabled);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_create_rejects_unknown_role() {
        let (users, _roles, _dir) = create_test_stores();

        let result = users.create(&CreateUserRequest {
            username: "ghost".to_string(),
            password: "password123".to_string(),
            role_id: "no-such-role".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_get_user() {
        let (users, roles, _dir) = create_test_stores();

        let created = users
            .create(&CreateUserRequest {
                username: "findme".to_string(),
                password: "password123".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        let found = users.get(&created.id).unwrap().unwrap();
        assert_eq!(found.username, "findme");

        let by_name = users.get_by_username("findme").unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[test]
    fn test_update_user() {
        let (users, roles, _dir) = create_test_stores();

        let created = users
            .create(&CreateUserRequest {
                username: "updateme".to_string(),
                password: "password123".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        let admin_role = roles.get_by_name("admin").unwrap().unwrap();
        let updated = users
            .update(
                &created.id,
                &UpdateUserRequest {
                    password: None,
                    role_id: Some(admin_role.id),
                    enabled: Some(false),
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.role.name, "admin");
        assert!(!updated.enabled);
    }

    #[test]
    fn test_update_missing_user_returns_none() {
        let (users, _roles, _dir) = create_test_stores();
        let result = users
            .update("missing", &UpdateUserRequest::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_user() {
        let (users, roles, _dir) = create_test_stores();

        let created = users
            .create(&CreateUserRequest {
                username: "deleteme".to_string(),
                password: "password123".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        assert!(users.delete(&created.id).unwrap());
        assert!(users.get(&created.id).unwrap().is_none());
    }

    #[test]
    fn test_list_users() {
        let (users, roles, _dir) = create_test_stores();

        for name in ["user1", "user2"] {
            users
                .create(&CreateUserRequest {
                    username: name.to_string(),
                    password: "password123".to_string(),
                    role_id: staff_role(&roles).id,
                })
                .unwrap();
        }

        let listed = users.list(None, None).unwrap();
        assert_eq!(listed.len(), 3); // admin + user1 + user2
    }

    #[test]
    fn test_verify_password() {
        let (users, roles, _dir) = create_test_stores();

        users
            .create(&CreateUserRequest {
                username: "authtest".to_string(),
                password: "correctpassword".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        let user = users
            .verify_password("authtest", "correctpassword")
            .unwrap();
        assert!(user.is_some());
        assert!(user.unwrap().last_login_at.is_some());

        assert!(users
            .verify_password("authtest", "wrongpassword")
            .unwrap()
            .is_none());
        assert!(users
            .verify_password("nonexistent", "password")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_disabled_user_cannot_login() {
        let (users, roles, _dir) = create_test_stores();

        let created = users
            .create(&CreateUserRequest {
                username: "disabled".to_string(),
                password: "password123".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        users
            .update(
                &created.id,
                &UpdateUserRequest {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(users
            .verify_password("disabled", "password123")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_password_validation() {
        let (users, roles, _dir) = create_test_stores();

        let result = users.create(&CreateUserRequest {
            username: "shortpw".to_string(),
            password: "short".to_string(),
            role_id: staff_role(&roles).id,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_username_fails() {
        let (users, roles, _dir) = create_test_stores();

        users
            .create(&CreateUserRequest {
                username: "duplicate".to_string(),
                password: "password123".to_string(),
                role_id: staff_role(&roles).id,
            })
            .unwrap();

        let result = users.create(&CreateUserRequest {
            username: "duplicate".to_string(),
            password: "password456".to_string(),
            role_id: staff_role(&roles).id,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_update_detection() {
        assert!(UpdateUserRequest::default().is_empty());
        assert!(!UpdateUserRequest {
            password: Some("newpassword1".into()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_password_hashing() {
        let password = "testpassword123";
        let hash = hash_password(password).unwrap();

        assert!(!hash.contains(password));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrongpassword", &hash).unwrap());
    }
}
