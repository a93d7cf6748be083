//! Repository for the `articles` table.
//!
//! Articles are addressed by their external `code`.

use sqlx::PgPool;

use crate::models::article::{Article, CreateArticle, UpdateArticle};

const COLUMNS: &str = "id, code, name, approval_group_id, created_at, updated_at";

/// Provides CRUD operations for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    /// Insert a new article, returning the created row.
    ///
    /// Duplicate code or name violates `uq_articles_code` / `uq_articles_name`.
    pub async fn create(pool: &PgPool, input: &CreateArticle) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (code, name, approval_group_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.approval_group_id)
            .fetch_one(pool)
            .await
    }

    /// Find an article by its external code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE code = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List all articles ordered by code.
    pub async fn list(pool: &PgPool) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles ORDER BY code");
        sqlx::query_as::<_, Article>(&query).fetch_all(pool).await
    }

    /// Update an article. Only non-`None` fields in `input` are applied.
    ///
    /// A new `code` cascades to referencing proposals through the foreign
    /// key. Returns `None` if no article has the given code.
    pub async fn update(
        pool: &PgPool,
        code: &str,
        input: &UpdateArticle,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                approval_group_id = COALESCE($4, approval_group_id)
             WHERE code = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(code)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.approval_group_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an article by code. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE code = $1")
            .bind(code)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
