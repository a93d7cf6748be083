//! Proposal snapshot ("before" values) model.

use knowmaint_core::proposal::ProposalTarget;
use knowmaint_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `proposals_before` table. Written once, never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProposalBefore {
    pub id: DbId,
    pub proposal_id: DbId,
    pub title_before: Option<String>,
    pub info_category_id_before: Option<DbId>,
    pub keywords_before: Option<String>,
    pub importance_before: Option<bool>,
    pub published_start_before: Option<Date>,
    pub published_end_before: Option<Date>,
    pub target_before: Option<ProposalTarget>,
    pub question_before: Option<String>,
    pub answer_before: Option<String>,
    pub add_comments_before: Option<String>,
    pub created_at: Timestamp,
}

/// Snapshot payload, supplied with a new proposal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProposalBefore {
    pub title_before: Option<String>,
    pub info_category_id_before: Option<DbId>,
    pub keywords_before: Option<String>,
    pub importance_before: Option<bool>,
    pub published_start_before: Option<Date>,
    pub published_end_before: Option<Date>,
    pub target_before: Option<ProposalTarget>,
    pub question_before: Option<String>,
    pub answer_before: Option<String>,
    pub add_comments_before: Option<String>,
}
