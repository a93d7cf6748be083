//! Centralized authorization policy.
//!
//! Every mutating or scoped-read operation asks [`authorize`] before touching
//! storage. The rules live in one `match` over [`Action`], so the whole policy
//! can be audited (and unit tested) without any HTTP plumbing.
//!
//! | Action                   | General        | Supervisor                          | Admin            |
//! |--------------------------|----------------|-------------------------------------|------------------|
//! | `ManageCatalog`          | deny           | deny                                | allow            |
//! | `ManageUsers`            | deny           | deny                                | allow            |
//! | `CreateProposal`         | allow          | allow                               | allow            |
//! | `ReadProposal`           | creator        | creator or own group                | allow            |
//! | `ListPendingProposals`   | deny           | allow (own group)                   | allow            |
//! | `UpdateProposal`         | creator        | creator                             | creator          |
//! | `DecideProposal`         | deny           | own group, not creator              | not creator      |
//! | `DeleteProposal`         | creator        | creator                             | allow            |
//! | `ReadUserStatistics`     | self           | allow                               | allow            |
//! | `ReadScopedStatistics`   | deny           | allow (own group)                   | allow            |
//! | `ReadGroupBreakdown`     | deny           | deny                                | allow            |
//!
//! Creator access to a proposal always succeeds, including a supervisor
//! reading their own proposal filed against another group's article.

use crate::error::CoreError;
use crate::roles::UserRole;
use crate::types::DbId;

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: UserRole,
    pub group_id: Option<DbId>,
}

/// Operation tags the policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create, update or delete a group, info category or article.
    ManageCatalog,
    /// Create, update, delete or list user accounts.
    ManageUsers,
    CreateProposal,
    ReadProposal,
    ListPendingProposals,
    /// Edit the content fields of a proposal.
    UpdateProposal,
    /// Approve or reject a proposal.
    DecideProposal,
    DeleteProposal,
    /// Per-user rollups (monthly count, approval rate, summary).
    ReadUserStatistics,
    /// Monthly trend and approval statistics, group-scoped for supervisors.
    ReadScopedStatistics,
    /// Per-group proposal counts across every group.
    ReadGroupBreakdown,
}

/// The part of a proposal the policy needs. Plain data, already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalRef {
    pub creator_id: DbId,
    pub approval_group_id: DbId,
}

/// What the action is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Collection-level or global actions.
    None,
    Proposal(ProposalRef),
    /// The subject user of a per-user report.
    User(DbId),
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Allow,
    Deny(&'static str),
}

impl Permission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert a denial into [`CoreError::Forbidden`].
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(CoreError::Forbidden(reason.to_string())),
        }
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// An action paired with the wrong kind of resource is denied.
pub fn authorize(actor: &Actor, action: Action, resource: Resource) -> Permission {
    use Permission::{Allow, Deny};

    match action {
        Action::ManageCatalog => admin_only(actor, "Admin role required"),
        Action::ManageUsers => admin_only(actor, "Admin role required"),
        Action::ReadGroupBreakdown => {
            admin_only(actor, "Only administrators can view group statistics")
        }

        Action::CreateProposal => Allow,

        Action::ReadProposal => {
            let Resource::Proposal(proposal) = resource else {
                return Deny("Access denied");
            };
            if proposal.creator_id == actor.user_id {
                return Allow;
            }
            match actor.role {
                UserRole::Admin => Allow,
                UserRole::Supervisor if in_group(actor, proposal.approval_group_id) => Allow,
                UserRole::Supervisor | UserRole::General => Deny("Access denied"),
            }
        }

        Action::ListPendingProposals | Action::ReadScopedStatistics => match actor.role {
            UserRole::Supervisor | UserRole::Admin => Allow,
            UserRole::General => Deny("Only supervisors and administrators can access this"),
        },

        Action::UpdateProposal => {
            let Resource::Proposal(proposal) = resource else {
                return Deny("Only the creator can update the proposal");
            };
            if proposal.creator_id == actor.user_id {
                Allow
            } else {
                Deny("Only the creator can update the proposal")
            }
        }

        Action::DecideProposal => {
            let Resource::Proposal(proposal) = resource else {
                return Deny("Access denied");
            };
            let role_allows = match actor.role {
                UserRole::Admin => Allow,
                UserRole::Supervisor if in_group(actor, proposal.approval_group_id) => Allow,
                UserRole::Supervisor => Deny("You can only approve proposals for your group"),
                UserRole::General => {
                    Deny("Only supervisors and administrators can approve proposals")
                }
            };
            if !role_allows.is_allowed() {
                return role_allows;
            }
            if proposal.creator_id == actor.user_id {
                return Deny("You cannot approve or reject your own proposal");
            }
            Allow
        }

        Action::DeleteProposal => {
            let Resource::Proposal(proposal) = resource else {
                return Deny("Access denied");
            };
            match actor.role {
                UserRole::Admin => Allow,
                UserRole::Supervisor | UserRole::General
                    if proposal.creator_id == actor.user_id =>
                {
                    Allow
                }
                UserRole::Supervisor | UserRole::General => Deny("Access denied"),
            }
        }

        Action::ReadUserStatistics => {
            let Resource::User(subject) = resource else {
                return Deny("Access denied");
            };
            match actor.role {
                UserRole::Supervisor | UserRole::Admin => Allow,
                UserRole::General if subject == actor.user_id => Allow,
                UserRole::General => Deny("Access denied"),
            }
        }
    }
}

/// [`authorize`] as a `Result`, for use with `?`.
pub fn require(actor: &Actor, action: Action, resource: Resource) -> Result<(), CoreError> {
    authorize(actor, action, resource).into_result()
}

fn admin_only(actor: &Actor, reason: &'static str) -> Permission {
    match actor.role {
        UserRole::Admin => Permission::Allow,
        UserRole::Supervisor | UserRole::General => Permission::Deny(reason),
    }
}

fn in_group(actor: &Actor, group_id: DbId) -> bool {
    actor.group_id == Some(group_id)
}
