//! Information category model and DTOs.

use knowmaint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `info_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InfoCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInfoCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInfoCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}
