//! Row shapes for statistics queries.

use knowmaint_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// One group with the number of proposals routed to it. Groups without
/// proposals appear with a zero count.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct GroupProposalCount {
    pub group_id: DbId,
    pub group_name: String,
    pub proposal_count: i64,
}
