//! Role-Based Access Control for the Teller portal.
//!
//! Roles are database entities administrators can rename, but the permission
//! model is static: the `admin` role holds every permission, any other role
//! holds the base staff set. A user carries exactly one role.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Permissions that can be granted to portal users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read user information
    UserRead,
    /// Create/update users
    UserWrite,
    /// Delete users
    UserAdmin,
    /// Rename/delete roles
    RoleAdmin,
    /// Use the warehouse chatbot
    ChatAccess,
    /// View the BI dashboard
    DashboardAccess,
}

impl Permission {
    /// Get all available permissions.
    pub fn all() -> &'static [Permission] {
        &[
            Permission::UserRead,
            Permission::UserWrite,
            Permission::UserAdmin,
            Permission::RoleAdmin,
            Permission::ChatAccess,
            Permission::DashboardAccess,
        ]
    }
}

/// Name of the privileged role. Seeded at first startup and pinned: it may
/// not be renamed away from this value or deleted.
pub const ADMIN_ROLE: &str = "admin";

/// Permissions granted to a role by name.
///
/// `admin` gets everything; every other role (including custom roles created
/// by administrators) gets the base staff set.
pub fn permissions_for(role_name: &str) -> HashSet<Permission> {
    if role_name == ADMIN_ROLE {
        Permission::all().iter().copied().collect()
    } else {
        [Permission::ChatAccess, Permission::DashboardAccess]
            .into_iter()
            .collect()
    }
}

/// Check if a user with the given role has a specific permission.
pub fn check_permission(role_name: &str, required: Permission) -> bool {
    permissions_for(role_name).contains(&required)
}
