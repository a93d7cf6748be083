//! Repository for the `proposals_before` snapshot table.
//!
//! Rows are insert-once: a second insert for the same proposal is a no-op,
//! and an update trigger in the schema refuses any rewrite.

use knowmaint_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::proposal_before::{CreateProposalBefore, ProposalBefore};

const COLUMNS: &str = "id, proposal_id, title_before, info_category_id_before, \
    keywords_before, importance_before, published_start_before, published_end_before, \
    target_before, question_before, answer_before, add_comments_before, created_at";

pub struct ProposalBeforeRepo;

impl ProposalBeforeRepo {
    /// Insert the snapshot for `proposal_id` unless one already exists.
    ///
    /// Returns the inserted row, or `None` when a snapshot was already there.
    pub async fn insert_if_absent(
        tx: &mut Transaction<'_, Postgres>,
        proposal_id: DbId,
        input: &CreateProposalBefore,
    ) -> Result<Option<ProposalBefore>, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals_before
                (proposal_id, title_before, info_category_id_before, keywords_before,
                 importance_before, published_start_before, published_end_before,
                 target_before, question_before, answer_before, add_comments_before)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (proposal_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalBefore>(&query)
            .bind(proposal_id)
            .bind(&input.title_before)
            .bind(input.info_category_id_before)
            .bind(&input.keywords_before)
            .bind(input.importance_before)
            .bind(input.published_start_before)
            .bind(input.published_end_before)
            .bind(input.target_before)
            .bind(&input.question_before)
            .bind(&input.answer_before)
            .bind(&input.add_comments_before)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Find the snapshot belonging to a proposal.
    pub async fn find_by_proposal(
        pool: &PgPool,
        proposal_id: DbId,
    ) -> Result<Option<ProposalBefore>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals_before WHERE proposal_id = $1");
        sqlx::query_as::<_, ProposalBefore>(&query)
            .bind(proposal_id)
            .fetch_optional(pool)
            .await
    }
}
