//! Proposal entity model and DTOs.

use knowmaint_core::policy::ProposalRef;
use knowmaint_core::proposal::{ProposalStatus, ProposalTarget, ProposalType};
use knowmaint_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::models::proposal_before::CreateProposalBefore;

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    /// Creator.
    pub user_id: DbId,
    /// External code of the target article.
    pub article_id: String,
    /// Article display name as it was when the proposal was filed.
    pub article_name: String,
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    pub status: ProposalStatus,
    pub title: String,
    pub info_category_id: Option<DbId>,
    pub keywords: Option<String>,
    pub importance: Option<bool>,
    pub published_start: Option<Date>,
    pub published_end: Option<Date>,
    pub target: Option<ProposalTarget>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub add_comments: Option<String>,
    pub reason: String,
    pub approval_group_id: DbId,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Proposal {
    /// The ownership and scope facts the authorization policy needs.
    pub fn policy_ref(&self) -> ProposalRef {
        ProposalRef {
            creator_id: self.user_id,
            approval_group_id: self.approval_group_id,
        }
    }
}

/// DTO for filing a new proposal.
///
/// The article's display name and approval group are not accepted from the
/// caller; they are copied from the `articles` row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProposal {
    /// External code of the target article.
    pub article_id: String,
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    pub title: String,
    pub info_category_id: Option<DbId>,
    pub keywords: Option<String>,
    pub importance: Option<bool>,
    pub published_start: Option<Date>,
    pub published_end: Option<Date>,
    pub target: Option<ProposalTarget>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub add_comments: Option<String>,
    pub reason: String,
    /// Currently published values, recorded as the proposal's snapshot.
    pub before: Option<CreateProposalBefore>,
}

/// DTO for the creator's content edits.
///
/// An omitted field is left untouched. The nullable content fields are
/// `Option<Option<T>>`: `Some(None)` (an explicit JSON `null`) clears the
/// column. `title` and `reason` are required columns, so `null` there means
/// "leave as is".
///
/// Status, approver and approval group cannot be changed through this DTO.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProposal {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub info_category_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "present")]
    pub keywords: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub importance: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    pub published_start: Option<Option<Date>>,
    #[serde(default, deserialize_with = "present")]
    pub published_end: Option<Option<Date>>,
    #[serde(default, deserialize_with = "present")]
    pub target: Option<Option<ProposalTarget>>,
    #[serde(default, deserialize_with = "present")]
    pub question: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub answer: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub add_comments: Option<Option<String>>,
    pub reason: Option<String>,
}

/// Marks a field that appeared in the body, even as `null`.
///
/// Only runs for keys that are present; absent keys fall back to
/// `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body of `POST /proposals/{id}/approve`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecideProposal {
    pub status: ProposalStatus,
    pub rejection_reason: Option<String>,
}
