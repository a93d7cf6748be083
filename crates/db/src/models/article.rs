//! Article entity model and DTOs.

use knowmaint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `articles` table.
///
/// `code` is the stable external identifier proposals point at; `id` is
/// internal only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub approval_group_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new article.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticle {
    pub code: String,
    pub name: String,
    pub approval_group_id: DbId,
}

/// DTO for updating an article. All fields are optional.
///
/// Changing `approval_group_id` affects future proposals only.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArticle {
    pub code: Option<String>,
    pub name: Option<String>,
    pub approval_group_id: Option<DbId>,
}
