//! Repository for the `proposals` table.
//!
//! Reads that are scoped by role take the scope values from
//! `knowmaint_core::visibility` and translate them into bind parameters, so
//! the SQL filter and the in-memory predicate express the same rule.
//!
//! Mutations that must observe the current status run inside a transaction
//! opened by the caller: [`ProposalRepo::lock_for_update`] takes the row
//! lock, and the conditional `WHERE status = 'pending'` on every write makes
//! a lost race visible as `None` instead of a silent overwrite.

use knowmaint_core::proposal::Decision;
use knowmaint_core::types::DbId;
use knowmaint_core::visibility::{ProposalFilter, ProposalVisibility, ReviewScope};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::proposal::{CreateProposal, Proposal, UpdateProposal};
use crate::repositories::ProposalBeforeRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, article_id, article_name, proposal_type, status, title, \
    info_category_id, keywords, importance, published_start, published_end, target, \
    question, answer, add_comments, reason, approval_group_id, approved_by, approved_at, \
    rejection_reason, created_at, updated_at";

/// Bind values for `($1 OR user_id = $2 OR approval_group_id = $3)`.
fn visibility_binds(visibility: ProposalVisibility) -> (bool, Option<DbId>, Option<DbId>) {
    match visibility {
        ProposalVisibility::All => (true, None, None),
        ProposalVisibility::GroupOrOwn { group_id, user_id } => (false, Some(user_id), group_id),
        ProposalVisibility::Own { user_id } => (false, Some(user_id), None),
    }
}

/// Bind values for `($1 OR approval_group_id = $2)`.
pub(crate) fn review_scope_binds(scope: ReviewScope) -> (bool, Option<DbId>) {
    match scope {
        ReviewScope::All => (true, None),
        ReviewScope::Group(group_id) => (false, group_id),
    }
}

/// Provides persistence for proposals.
pub struct ProposalRepo;

impl ProposalRepo {
    /// File a proposal against the article with code `input.article_id`.
    ///
    /// The article's display name and approval group are copied inside the
    /// same statement. When `input.before` is present the snapshot is written
    /// in the same transaction. Returns `None` (and writes nothing) when no
    /// article has that code.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateProposal,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO proposals
                (user_id, article_id, article_name, approval_group_id, proposal_type,
                 title, info_category_id, keywords, importance, published_start,
                 published_end, target, question, answer, add_comments, reason)
             SELECT $1, a.code, a.name, a.approval_group_id, $3,
                    $4, $5, $6, $7, $8,
                    $9, $10, $11, $12, $13, $14
             FROM articles a
             WHERE a.code = $2
             RETURNING {COLUMNS}"
        );
        let proposal = sqlx::query_as::<_, Proposal>(&query)
            .bind(user_id)
            .bind(&input.article_id)
            .bind(input.proposal_type)
            .bind(&input.title)
            .bind(input.info_category_id)
            .bind(&input.keywords)
            .bind(input.importance)
            .bind(input.published_start)
            .bind(input.published_end)
            .bind(input.target)
            .bind(&input.question)
            .bind(&input.answer)
            .bind(&input.add_comments)
            .bind(&input.reason)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(proposal) = proposal else {
            return Ok(None);
        };

        if let Some(before) = &input.before {
            ProposalBeforeRepo::insert_if_absent(&mut tx, proposal.id, before).await?;
        }

        tx.commit().await?;
        Ok(Some(proposal))
    }

    /// Find a proposal by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the proposals a filter admits, oldest first.
    pub async fn list(pool: &PgPool, filter: &ProposalFilter) -> Result<Vec<Proposal>, sqlx::Error> {
        let (see_all, user_id, group_id) = visibility_binds(filter.visibility);
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE ($1 OR user_id = $2 OR approval_group_id = $3)
               AND ($4::proposal_status IS NULL OR status = $4)
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(see_all)
            .bind(user_id)
            .bind(group_id)
            .bind(filter.status)
            .fetch_all(pool)
            .await
    }

    /// List pending proposals inside a reviewer's scope, oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        scope: ReviewScope,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let (see_all, group_id) = review_scope_binds(scope);
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE status = 'pending'
               AND ($1 OR approval_group_id = $2)
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(see_all)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Load a proposal and hold its row lock until `tx` ends.
    pub async fn lock_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Apply the creator's content edits.
    ///
    /// `title` and `reason` use `COALESCE`, so only provided values change.
    /// The nullable fields bind a "provided" flag next to the value: when the
    /// flag is set the column takes the value, `NULL` included.
    ///
    /// Returns `None` if the proposal is gone or no longer pending.
    pub async fn update_content(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateProposal,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET
                title = COALESCE($2, title),
                info_category_id = CASE WHEN $3 THEN $4 ELSE info_category_id END,
                keywords = CASE WHEN $5 THEN $6 ELSE keywords END,
                importance = CASE WHEN $7 THEN $8 ELSE importance END,
                published_start = CASE WHEN $9 THEN $10 ELSE published_start END,
                published_end = CASE WHEN $11 THEN $12 ELSE published_end END,
                target = CASE WHEN $13 THEN $14 ELSE target END,
                question = CASE WHEN $15 THEN $16 ELSE question END,
                answer = CASE WHEN $17 THEN $18 ELSE answer END,
                add_comments = CASE WHEN $19 THEN $20 ELSE add_comments END,
                reason = COALESCE($21, reason)
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.info_category_id.is_some())
            .bind(input.info_category_id.flatten())
            .bind(input.keywords.is_some())
            .bind(input.keywords.as_ref().and_then(|v| v.as_deref()))
            .bind(input.importance.is_some())
            .bind(input.importance.flatten())
            .bind(input.published_start.is_some())
            .bind(input.published_start.flatten())
            .bind(input.published_end.is_some())
            .bind(input.published_end.flatten())
            .bind(input.target.is_some())
            .bind(input.target.flatten())
            .bind(input.question.is_some())
            .bind(input.question.as_ref().and_then(|v| v.as_deref()))
            .bind(input.answer.is_some())
            .bind(input.answer.as_ref().and_then(|v| v.as_deref()))
            .bind(input.add_comments.is_some())
            .bind(input.add_comments.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.reason)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a pending proposal to the decided status.
    ///
    /// Records the approver and the decision time. Returns `None` if the row
    /// was no longer pending.
    pub async fn apply_decision(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        approver_id: DbId,
        decision: &Decision,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET
                status = $2,
                approved_by = $3,
                approved_at = NOW(),
                rejection_reason = $4
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(decision.status)
            .bind(approver_id)
            .bind(&decision.rejection_reason)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete a proposal; its snapshot goes with it. Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
