//! Shared read-side predicates deciding which records each role sees and can act on.

use serde::{Deserialize, Serialize};

use super::approval::{cleared_for_principal, decide, ApprovalAction};
use super::domain::{ActorContext, LeaveRecord, LeaveStatus, LeaveType, Role};

/// Whether `record` belongs in the actor's views (dashboards, request lists).
pub fn is_visible_to(
    actor: &ActorContext,
    owner_department: Option<&str>,
    record: &LeaveRecord,
) -> bool {
    if record.is_owned_by(&actor.user_id) {
        return true;
    }

    match actor.role {
        Role::Staff => false,
        Role::Hod => match (actor.department.as_deref(), owner_department) {
            (Some(mine), Some(theirs)) => mine.trim().eq_ignore_ascii_case(theirs.trim()),
            _ => false,
        },
        Role::Principal => record.status != LeaveStatus::Pending && cleared_for_principal(record),
        Role::Director => record.leave_type == LeaveType::Compensatory,
        Role::Admin => true,
    }
}

/// Whether the actor can currently take any approval action on `record`.
pub fn is_actionable_for(
    actor: &ActorContext,
    owner_department: Option<&str>,
    record: &LeaveRecord,
) -> bool {
    ApprovalAction::ALL
        .into_iter()
        .any(|action| decide(actor, owner_department, record, action).is_ok())
}

/// Status counts over a snapshot of records, as shown on dashboard stat cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub recommended: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a LeaveRecord>,
    {
        records
            .into_iter()
            .fold(StatusSummary::default(), |mut summary, record| {
                summary.total += 1;
                match record.status {
                    LeaveStatus::Pending => summary.pending += 1,
                    LeaveStatus::Recommended => summary.recommended += 1,
                    LeaveStatus::Approved => summary.approved += 1,
                    LeaveStatus::Rejected => summary.rejected += 1,
                }
                summary
            })
    }

    /// Requests still awaiting a final decision.
    pub fn in_flight(&self) -> usize {
        self.pending + self.recommended
    }
}
