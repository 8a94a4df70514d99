//! Status transitions for leave records and the authority each role holds over them.
//!
//! `Pending -> Recommended -> Approved`, with `Rejected` reachable from either open state.
//! Compensatory leave needs a director's recommendation before a principal may decide on it.

use serde::{Deserialize, Serialize};

use super::domain::{ActorContext, LeaveRecord, LeaveStatus, LeaveType, Role};

/// Action an approving role can take on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Recommend,
    Approve,
    Reject,
}

impl ApprovalAction {
    pub const ALL: [ApprovalAction; 3] = [
        ApprovalAction::Recommend,
        ApprovalAction::Approve,
        ApprovalAction::Reject,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApprovalAction::Recommend => "recommend",
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
        }
    }
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The actor does not hold the right to perform the attempted action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("{role} may not {action} this leave request")]
    RoleNotPermitted { role: Role, action: ApprovalAction },
    #[error("leave request belongs to a user outside the reviewer's department")]
    OutsideDepartment,
    #[error("users may not act on their own leave requests")]
    OwnRecord,
    #[error("only the owner may edit a leave request")]
    NotOwner,
    #[error("compensatory leave requires a director recommendation first")]
    AwaitingDirector,
}

/// The record's current status does not admit the attempted change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("leave request is already {status}")]
    Terminal { status: LeaveStatus },
    #[error("cannot {action} a leave request that is {from}")]
    NotAllowed {
        from: LeaveStatus,
        action: ApprovalAction,
    },
    #[error("only pending leave requests can be edited (current status: {status})")]
    NotEditable { status: LeaveStatus },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Outcome of a permitted action, ready to apply to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: LeaveStatus,
    pub to: LeaveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_by: Option<Role>,
}

impl Transition {
    fn moved(from: LeaveStatus, to: LeaveStatus) -> Self {
        Self {
            from,
            to,
            recommended_by: None,
        }
    }

    fn recommended(from: LeaveStatus, by: Role) -> Self {
        Self {
            from,
            to: LeaveStatus::Recommended,
            recommended_by: Some(by),
        }
    }

    /// Write the transition into the record. `recommended_by` is only ever overwritten, never
    /// cleared.
    pub fn apply(&self, record: &mut LeaveRecord) {
        record.status = self.to;
        if let Some(role) = self.recommended_by {
            record.recommended_by = Some(role);
        }
    }
}

/// Decide whether `actor` may perform `action` on `record`.
///
/// `owner_department` is the department of the record's owner as reported by the directory; it
/// only matters for department-scoped reviewers.
pub fn decide(
    actor: &ActorContext,
    owner_department: Option<&str>,
    record: &LeaveRecord,
    action: ApprovalAction,
) -> Result<Transition, ApprovalError> {
    if record.is_owned_by(&actor.user_id) {
        return Err(AuthorizationError::OwnRecord.into());
    }

    if record.status.is_terminal() {
        return Err(TransitionError::Terminal {
            status: record.status,
        }
        .into());
    }

    let denied = AuthorizationError::RoleNotPermitted {
        role: actor.role,
        action,
    };
    let not_allowed = TransitionError::NotAllowed {
        from: record.status,
        action,
    };

    match actor.role {
        Role::Staff => Err(denied.into()),
        Role::Hod => {
            if !same_department(actor.department.as_deref(), owner_department) {
                return Err(AuthorizationError::OutsideDepartment.into());
            }
            match (record.status, action) {
                (_, ApprovalAction::Approve) => Err(denied.into()),
                (LeaveStatus::Pending, ApprovalAction::Recommend) => {
                    Ok(Transition::recommended(record.status, Role::Hod))
                }
                (LeaveStatus::Pending, ApprovalAction::Reject) => {
                    Ok(Transition::moved(record.status, LeaveStatus::Rejected))
                }
                _ => Err(not_allowed.into()),
            }
        }
        Role::Director => {
            if record.leave_type != LeaveType::Compensatory {
                return Err(denied.into());
            }
            match action {
                ApprovalAction::Approve => Err(denied.into()),
                ApprovalAction::Recommend if record.recommended_by == Some(Role::Director) => {
                    Err(not_allowed.into())
                }
                ApprovalAction::Recommend => {
                    Ok(Transition::recommended(record.status, Role::Director))
                }
                ApprovalAction::Reject => {
                    Ok(Transition::moved(record.status, LeaveStatus::Rejected))
                }
            }
        }
        Role::Principal => {
            if action == ApprovalAction::Recommend {
                return Err(denied.into());
            }
            if record.status != LeaveStatus::Recommended {
                return Err(not_allowed.into());
            }
            if !cleared_for_principal(record) {
                return Err(AuthorizationError::AwaitingDirector.into());
            }
            let to = match action {
                ApprovalAction::Approve => LeaveStatus::Approved,
                _ => LeaveStatus::Rejected,
            };
            Ok(Transition::moved(record.status, to))
        }
        Role::Admin => match (record.status, action) {
            (LeaveStatus::Pending, ApprovalAction::Recommend) => {
                Ok(Transition::recommended(record.status, Role::Admin))
            }
            (_, ApprovalAction::Recommend) => Err(not_allowed.into()),
            (_, ApprovalAction::Approve) => {
                Ok(Transition::moved(record.status, LeaveStatus::Approved))
            }
            (_, ApprovalAction::Reject) => {
                Ok(Transition::moved(record.status, LeaveStatus::Rejected))
            }
        },
    }
}

/// Compensatory leave only reaches the principal through a director.
pub fn cleared_for_principal(record: &LeaveRecord) -> bool {
    record.leave_type != LeaveType::Compensatory || record.recommended_by == Some(Role::Director)
}

fn same_department(actor: Option<&str>, owner: Option<&str>) -> bool {
    match (actor, owner) {
        (Some(actor), Some(owner)) => actor.trim().eq_ignore_ascii_case(owner.trim()),
        _ => false,
    }
}
