//! Leave-request lifecycle: eligibility checks, approval routing, and balance accounting.

pub mod approval;
pub mod balance;
pub mod domain;
pub mod import;
pub mod queue;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use approval::{
    decide, ApprovalAction, ApprovalError, AuthorizationError, Transition, TransitionError,
};
pub use balance::{compute_balances, LeaveBalance, LeaveLimitsError, LeaveTypeLimits};
pub use domain::{
    ActorContext, LeaveId, LeaveRecord, LeaveRequestDraft, LeaveStatus, LeaveType, LeaveWindow,
    Role, Session, UnknownVariant, UserId,
};
pub use import::{LeaveImportError, LeaveRecordImporter};
pub use queue::{is_actionable_for, is_visible_to, StatusSummary};
pub use repository::{
    Clock, Directory, DirectoryError, FixedClock, LeaveRepository, RepositoryError, SystemClock,
};
pub use router::leave_router;
pub use service::{LeaveService, LeaveServiceError};
pub use validation::{
    Acceptance, LeaveCandidate, LeaveValidator, SessionCutoffs, SubmissionWindow, ValidationError,
};
