//! Aggregate queries behind the statistics endpoints.
//!
//! Only the counting happens here. Rates, rounding and zero filling live in
//! `knowmaint_core::statistics`.

use knowmaint_core::proposal::{ProposalStatus, ProposalType};
use knowmaint_core::types::DbId;
use knowmaint_core::visibility::ReviewScope;
use sqlx::PgPool;

use crate::models::statistics::GroupProposalCount;
use crate::repositories::proposal_repo::review_scope_binds;

/// Status totals for a scope: `(pending, approved, rejected)`.
pub type StatusTotals = (i64, i64, i64);

pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Proposals a user created in the given calendar month. Zero if none.
    pub async fn monthly_count(
        pool: &PgPool,
        user_id: DbId,
        year: i32,
        month: i32,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM proposals
             WHERE user_id = $1
               AND EXTRACT(YEAR FROM created_at)::INT4 = $2
               AND EXTRACT(MONTH FROM created_at)::INT4 = $3",
        )
        .bind(user_id)
        .bind(year)
        .bind(month)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// `(total, approved)` proposal counts for one creator.
    pub async fn user_approval_counts(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'approved')
             FROM proposals
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Counts per status for one creator. Statuses with no rows are absent.
    pub async fn user_status_counts(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<(ProposalStatus, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM proposals
             WHERE user_id = $1
             GROUP BY status
             ORDER BY status",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Counts per proposal type for one creator. Types with no rows are absent.
    pub async fn user_type_counts(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<(ProposalType, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT proposal_type, COUNT(*) FROM proposals
             WHERE user_id = $1
             GROUP BY proposal_type
             ORDER BY proposal_type",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Every group with its proposal count, including groups with none.
    pub async fn group_proposal_counts(
        pool: &PgPool,
    ) -> Result<Vec<GroupProposalCount>, sqlx::Error> {
        sqlx::query_as::<_, GroupProposalCount>(
            "SELECT g.id AS group_id, g.name AS group_name, COUNT(p.id) AS proposal_count
             FROM groups g
             LEFT JOIN proposals p ON p.approval_group_id = g.id
             GROUP BY g.id, g.name
             ORDER BY g.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Sparse `(month, count)` rows for proposals created in `year`.
    pub async fn monthly_counts_for_year(
        pool: &PgPool,
        year: i32,
        scope: ReviewScope,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        let (see_all, group_id) = review_scope_binds(scope);
        sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM created_at)::INT4 AS month, COUNT(*)
             FROM proposals
             WHERE EXTRACT(YEAR FROM created_at)::INT4 = $1
               AND ($2 OR approval_group_id = $3)
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(year)
        .bind(see_all)
        .bind(group_id)
        .fetch_all(pool)
        .await
    }

    /// Pending, approved and rejected totals inside a scope.
    pub async fn status_totals(
        pool: &PgPool,
        scope: ReviewScope,
    ) -> Result<StatusTotals, sqlx::Error> {
        let (see_all, group_id) = review_scope_binds(scope);
        sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'pending'),
                    COUNT(*) FILTER (WHERE status = 'approved'),
                    COUNT(*) FILTER (WHERE status = 'rejected')
             FROM proposals
             WHERE ($1 OR approval_group_id = $2)",
        )
        .bind(see_all)
        .bind(group_id)
        .fetch_one(pool)
        .await
    }
}
