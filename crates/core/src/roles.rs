//! User roles.
//!
//! Stored in the `user_role` Postgres enum created by
//! `20250601000001_create_groups_and_users.sql`.

use serde::{Deserialize, Serialize};

/// The three roles a user can hold.
///
/// Privilege for administrative actions grows `General < Supervisor < Admin`,
/// but a supervisor's approval authority only covers their own group. See
/// [`crate::policy`] for the exact rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    General,
    Supervisor,
    Admin,
}

impl UserRole {
    /// Return the role name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
