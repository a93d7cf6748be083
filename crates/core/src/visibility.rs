//! Role-scoped visibility of proposals.
//!
//! The listing rules are expressed once here as data ([`ProposalVisibility`],
//! [`ReviewScope`]) and as a pure predicate. The repository layer translates
//! the same values into SQL so both sides agree on who sees what.

use crate::policy::Actor;
use crate::proposal::ProposalStatus;
use crate::roles::UserRole;
use crate::types::DbId;

/// Which proposals an actor may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalVisibility {
    /// Admins see every proposal.
    All,
    /// Supervisors see their approval group's proposals plus their own.
    GroupOrOwn {
        group_id: Option<DbId>,
        user_id: DbId,
    },
    /// General users see only what they created.
    Own { user_id: DbId },
}

impl ProposalVisibility {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            UserRole::Admin => Self::All,
            UserRole::Supervisor => Self::GroupOrOwn {
                group_id: actor.group_id,
                user_id: actor.user_id,
            },
            UserRole::General => Self::Own {
                user_id: actor.user_id,
            },
        }
    }

    /// Whether a proposal with this creator and approval group is visible.
    pub fn permits(&self, creator_id: DbId, approval_group_id: DbId) -> bool {
        match *self {
            Self::All => true,
            Self::GroupOrOwn { group_id, user_id } => {
                creator_id == user_id || group_id == Some(approval_group_id)
            }
            Self::Own { user_id } => creator_id == user_id,
        }
    }
}

/// Visibility plus the optional `?status=` equality filter of the list
/// endpoint. The status filter narrows the role scope, never widens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalFilter {
    pub visibility: ProposalVisibility,
    pub status: Option<ProposalStatus>,
}

impl ProposalFilter {
    pub fn new(actor: &Actor, status: Option<ProposalStatus>) -> Self {
        Self {
            visibility: ProposalVisibility::for_actor(actor),
            status,
        }
    }

    pub fn permits(
        &self,
        creator_id: DbId,
        approval_group_id: DbId,
        status: ProposalStatus,
    ) -> bool {
        self.visibility.permits(creator_id, approval_group_id)
            && self.status.map_or(true, |wanted| wanted == status)
    }
}

/// Group scope for reviewer-only views: the pending queue, the monthly trend
/// and approval statistics.
///
/// Only meaningful after the caller passed the matching policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewScope {
    All,
    /// A supervisor without a group has an empty scope.
    Group(Option<DbId>),
}

impl ReviewScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            UserRole::Admin => Self::All,
            UserRole::Supervisor | UserRole::General => Self::Group(actor.group_id),
        }
    }

    pub fn permits(&self, approval_group_id: DbId) -> bool {
        match *self {
            Self::All => true,
            Self::Group(group_id) => group_id == Some(approval_group_id),
        }
    }
}
