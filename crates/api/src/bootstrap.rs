//! First-administrator seeding.
//!
//! User management is admin-only, so a fresh database needs one admin
//! created out of band. When `BOOTSTRAP_ADMIN_*` is configured and the
//! `users` table is empty, startup creates that account.

use knowmaint_core::roles::UserRole;
use knowmaint_core::validation::{require_non_empty, validate_email, validate_password};
use knowmaint_db::models::user::{CreateUser, User};
use knowmaint_db::repositories::UserRepo;
use knowmaint_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured admin if no user exists yet.
///
/// Returns the new user, or `None` when the table already had rows.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<Option<User>> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    let username = require_non_empty("BOOTSTRAP_ADMIN_USERNAME", &admin.username)?;
    validate_email(&admin.email)?;
    validate_password(&admin.password)?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: admin.email.clone(),
            password_hash,
            role: UserRole::Admin,
            group_id: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");

    Ok(Some(user))
}
