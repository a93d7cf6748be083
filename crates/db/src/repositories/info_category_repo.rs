//! Repository for the `info_categories` table.

use knowmaint_core::types::DbId;
use sqlx::PgPool;

use crate::models::info_category::{CreateInfoCategory, InfoCategory, UpdateInfoCategory};

const COLUMNS: &str = "id, name, description, created_at, updated_at";

pub struct InfoCategoryRepo;

impl InfoCategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateInfoCategory,
    ) -> Result<InfoCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO info_categories (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InfoCategory>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<InfoCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM info_categories WHERE id = $1");
        sqlx::query_as::<_, InfoCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<InfoCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM info_categories ORDER BY name, id");
        sqlx::query_as::<_, InfoCategory>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInfoCategory,
    ) -> Result<Option<InfoCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE info_categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InfoCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM info_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
