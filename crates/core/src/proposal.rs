//! Proposal enumerations and the lifecycle state machine.
//!
//! ```text
//! Pending ──approve──▶ Approved   (terminal)
//!    │
//!    └────reject────▶ Rejected   (terminal, rejection_reason required)
//! ```
//!
//! `Pending` is the only initial state. Nothing leaves a terminal state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// What a proposal asks to do with the target article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "proposal_type", rename_all = "snake_case")]
pub enum ProposalType {
    Modify,
    Delete,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ProposalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "proposal_status", rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Pending => false,
            Self::Approved | Self::Rejected => true,
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience an article is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "proposal_target", rename_all = "snake_case")]
pub enum ProposalTarget {
    Internal,
    External,
    NotApplicable,
}

impl ProposalTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::NotApplicable => "not_applicable",
        }
    }
}

impl std::fmt::Display for ProposalTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// A validated Pending -> terminal transition, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub status: ProposalStatus,
    /// `None` when approving; always non-blank when rejecting.
    pub rejection_reason: Option<String>,
}

/// Reject decision requests that do not name a terminal status.
///
/// Runs before any row is touched, so a request asking for `pending` fails
/// validation without taking a lock.
pub fn validate_decision_target(target: ProposalStatus) -> Result<(), CoreError> {
    if target.is_terminal() {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "status must be 'approved' or 'rejected'".into(),
        ))
    }
}

/// The proposal must still be pending for any transition or creator edit.
pub fn ensure_pending(current: ProposalStatus) -> Result<(), CoreError> {
    if current == ProposalStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Proposal is not pending approval (current status: {current})"
        )))
    }
}

/// Build the [`Decision`] to persist from the requested status and reason.
///
/// Approving discards any supplied reason. Rejecting requires a reason that
/// is non-empty after trimming.
pub fn resolve_decision(
    target: ProposalStatus,
    rejection_reason: Option<&str>,
) -> Result<Decision, CoreError> {
    match target {
        ProposalStatus::Approved => Ok(Decision {
            status: ProposalStatus::Approved,
            rejection_reason: None,
        }),
        ProposalStatus::Rejected => {
            let reason = rejection_reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| {
                    CoreError::Validation(
                        "rejection_reason is required when rejecting a proposal".into(),
                    )
                })?;
            Ok(Decision {
                status: ProposalStatus::Rejected,
                rejection_reason: Some(reason.to_string()),
            })
        }
        ProposalStatus::Pending => Err(CoreError::Validation(
            "status must be 'approved' or 'rejected'".into(),
        )),
    }
}

/// Standing invariant for every write of a proposal row: a rejected proposal
/// carries a non-blank rejection reason.
///
/// The `chk_proposals_rejection_reason` constraint enforces the same rule
/// inside the database.
pub fn check_rejection_invariant(
    status: ProposalStatus,
    rejection_reason: Option<&str>,
) -> Result<(), CoreError> {
    let has_reason = rejection_reason.is_some_and(|r| !r.trim().is_empty());
    if status == ProposalStatus::Rejected && !has_reason {
        return Err(CoreError::Validation(
            "a rejected proposal must carry a non-empty rejection_reason".into(),
        ));
    }
    Ok(())
}
