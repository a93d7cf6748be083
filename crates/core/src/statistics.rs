//! Statistics rollups over proposals.
//!
//! The repository layer runs the `COUNT(*)` queries; this module owns the
//! arithmetic and the response shapes: percentage rounding, zero-safe rates,
//! the twelve-month zero fill and the "as observed" summary maps.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::proposal::{ProposalStatus, ProposalType};
use crate::types::DbId;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total * 100`, rounded to two decimals. Zero when `total` is zero.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Reject months outside 1..=12.
pub fn validate_month(month: u32) -> Result<(), CoreError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Per-user reports
// ---------------------------------------------------------------------------

/// Proposals created by one user in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProposalCount {
    pub user_id: DbId,
    pub year: i32,
    pub month: u32,
    pub count: i64,
}

/// Share of a user's proposals that ended up approved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalRate {
    pub user_id: DbId,
    pub total_proposals: i64,
    pub approved_proposals: i64,
    pub approval_rate: f64,
}

impl ApprovalRate {
    pub fn from_counts(user_id: DbId, total: i64, approved: i64) -> Self {
        Self {
            user_id,
            total_proposals: total,
            approved_proposals: approved,
            approval_rate: percentage(approved, total),
        }
    }
}

/// Counts by status and by type for one user.
///
/// Only observed keys appear; a status the user never reached is absent
/// rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalSummary {
    pub user_id: DbId,
    pub status_summary: BTreeMap<String, i64>,
    pub type_summary: BTreeMap<String, i64>,
}

impl ProposalSummary {
    pub fn from_groups(
        user_id: DbId,
        by_status: &[(ProposalStatus, i64)],
        by_type: &[(ProposalType, i64)],
    ) -> Self {
        Self {
            user_id,
            status_summary: by_status
                .iter()
                .map(|(status, count)| (status.as_str().to_string(), *count))
                .collect(),
            type_summary: by_type
                .iter()
                .map(|(kind, count)| (kind.as_str().to_string(), *count))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reviewer reports
// ---------------------------------------------------------------------------

/// One calendar month of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: u32,
    pub count: i64,
}

/// Twelve-month proposal trend for a year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub year: i32,
    pub monthly_trends: Vec<MonthlyCount>,
}

impl MonthlyTrend {
    /// Expand sparse `(month, count)` rows into exactly twelve entries,
    /// months 1 through 12, with zero for months that had no rows.
    pub fn fill(year: i32, rows: &[(i32, i64)]) -> Self {
        let observed: BTreeMap<i32, i64> = rows.iter().copied().collect();
        let monthly_trends = (1..=12u32)
            .map(|month| MonthlyCount {
                month,
                count: observed.get(&(month as i32)).copied().unwrap_or(0),
            })
            .collect();
        Self {
            year,
            monthly_trends,
        }
    }
}

/// Status breakdown with approval and rejection rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalStatistics {
    pub total_proposals: i64,
    pub pending_proposals: i64,
    pub approved_proposals: i64,
    pub rejected_proposals: i64,
    pub approval_rate: f64,
    pub rejection_rate: f64,
}

impl ApprovalStatistics {
    pub fn from_counts(pending: i64, approved: i64, rejected: i64) -> Self {
        let total = pending + approved + rejected;
        Self {
            total_proposals: total,
            pending_proposals: pending,
            approved_proposals: approved,
            rejected_proposals: rejected,
            approval_rate: percentage(approved, total),
            rejection_rate: percentage(rejected, total),
        }
    }
}
