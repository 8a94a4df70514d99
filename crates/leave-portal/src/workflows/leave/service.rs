use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use super::approval::{
    decide, ApprovalAction, ApprovalError, AuthorizationError, TransitionError,
};
use super::balance::{compute_balances, LeaveBalance, LeaveTypeLimits};
use super::domain::{
    ActorContext, LeaveId, LeaveRecord, LeaveRequestDraft, LeaveStatus, LeaveType, UserId,
};
use super::queue::{is_actionable_for, is_visible_to, StatusSummary};
use super::repository::{
    Clock, Directory, DirectoryError, LeaveRepository, RepositoryError, SystemClock,
};
use super::validation::{LeaveValidator, SubmissionWindow, ValidationError};

/// Service composing the validator, approval rules, and storage collaborators.
pub struct LeaveService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    validator: LeaveValidator,
    limits: Arc<LeaveTypeLimits>,
    clock: Arc<dyn Clock>,
}

static LEAVE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_leave_id() -> LeaveId {
    let id = LEAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeaveId(format!("leave-{id:06}"))
}

impl<R, D> LeaveService<R, D>
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, limits: LeaveTypeLimits) -> Self {
        Self {
            repository,
            directory,
            validator: LeaveValidator::default(),
            limits: Arc::new(limits),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_validator(mut self, validator: LeaveValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Validate and store a new request owned by the actor. Status always starts `Pending`.
    pub fn submit(
        &self,
        actor: &ActorContext,
        draft: LeaveRequestDraft,
    ) -> Result<LeaveRecord, LeaveServiceError> {
        let now = self.clock.now();
        let existing = self.repository.for_user(&actor.user_id)?;

        let acceptance = self
            .validator
            .validate_draft(&actor.user_id, &draft, &existing, now, None)
            .inspect_err(|error| {
                warn!(user_id = %actor.user_id, %error, "leave submission rejected");
            })?;

        let record = LeaveRecord {
            id: next_leave_id(),
            user_id: actor.user_id.clone(),
            leave_type: draft.leave_type,
            from_date: acceptance.window.from_date,
            to_date: acceptance.window.to_date,
            session: acceptance.window.session,
            leave_value: acceptance.leave_value,
            status: LeaveStatus::Pending,
            recommended_by: None,
            reason: draft.reason,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        info!(
            leave_id = %stored.id,
            user_id = %stored.user_id,
            leave_type = %stored.leave_type,
            leave_value = stored.leave_value,
            "leave request submitted"
        );
        Ok(stored)
    }

    /// Replace the content of a pending request. Re-validates against the owner's other records
    /// and re-derives the leave value.
    pub fn edit(
        &self,
        actor: &ActorContext,
        leave_id: &LeaveId,
        draft: LeaveRequestDraft,
    ) -> Result<LeaveRecord, LeaveServiceError> {
        let mut record = self.get(leave_id)?;

        if !record.is_owned_by(&actor.user_id) {
            return Err(AuthorizationError::NotOwner.into());
        }
        if record.status != LeaveStatus::Pending {
            return Err(TransitionError::NotEditable {
                status: record.status,
            }
            .into());
        }

        let now = self.clock.now();
        let existing = self.repository.for_user(&actor.user_id)?;
        let acceptance = self
            .validator
            .validate_draft(&actor.user_id, &draft, &existing, now, Some(leave_id))
            .inspect_err(|error| {
                warn!(leave_id = %leave_id, %error, "leave edit rejected");
            })?;

        record.leave_type = draft.leave_type;
        record.from_date = acceptance.window.from_date;
        record.to_date = acceptance.window.to_date;
        record.session = acceptance.window.session;
        record.leave_value = acceptance.leave_value;
        record.reason = draft.reason;
        record.description = draft.description;
        record.updated_at = now;

        self.repository.update(record.clone())?;
        info!(leave_id = %record.id, leave_value = record.leave_value, "leave request edited");
        Ok(record)
    }

    pub fn recommend(
        &self,
        actor: &ActorContext,
        leave_id: &LeaveId,
    ) -> Result<LeaveRecord, LeaveServiceError> {
        self.act(actor, leave_id, ApprovalAction::Recommend)
    }

    pub fn approve(
        &self,
        actor: &ActorContext,
        leave_id: &LeaveId,
    ) -> Result<LeaveRecord, LeaveServiceError> {
        self.act(actor, leave_id, ApprovalAction::Approve)
    }

    pub fn reject(
        &self,
        actor: &ActorContext,
        leave_id: &LeaveId,
    ) -> Result<LeaveRecord, LeaveServiceError> {
        self.act(actor, leave_id, ApprovalAction::Reject)
    }

    /// Run an approval action through the state machine and persist the result.
    pub fn act(
        &self,
        actor: &ActorContext,
        leave_id: &LeaveId,
        action: ApprovalAction,
    ) -> Result<LeaveRecord, LeaveServiceError> {
        let mut record = self.get(leave_id)?;
        let owner_department = self.directory.department_of(&record.user_id)?;

        let transition = decide(actor, owner_department.as_deref(), &record, action)
            .inspect_err(|error| {
                warn!(
                    leave_id = %leave_id,
                    actor = %actor.user_id,
                    role = %actor.role,
                    %action,
                    %error,
                    "approval action refused"
                );
            })?;

        transition.apply(&mut record);
        record.updated_at = self.clock.now();
        self.repository.update(record.clone())?;

        info!(
            leave_id = %record.id,
            actor = %actor.user_id,
            role = %actor.role,
            from = %transition.from,
            to = %transition.to,
            "leave request status changed"
        );
        Ok(record)
    }

    pub fn get(&self, leave_id: &LeaveId) -> Result<LeaveRecord, LeaveServiceError> {
        let record = self
            .repository
            .fetch(leave_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// A user's requests, newest first.
    pub fn history(&self, user_id: &UserId) -> Result<Vec<LeaveRecord>, LeaveServiceError> {
        let mut records = self.repository.for_user(user_id)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub fn balances(
        &self,
        user_id: &UserId,
        year: i32,
    ) -> Result<BTreeMap<LeaveType, LeaveBalance>, LeaveServiceError> {
        let records = self.repository.for_user(user_id)?;
        Ok(compute_balances(&records, year, &self.limits))
    }

    /// Records the actor can act on right now, oldest first.
    pub fn queue(&self, actor: &ActorContext) -> Result<Vec<LeaveRecord>, LeaveServiceError> {
        let mut queue = Vec::new();
        for record in self.repository.all()? {
            let owner_department = self.directory.department_of(&record.user_id)?;
            if is_actionable_for(actor, owner_department.as_deref(), &record) {
                queue.push(record);
            }
        }
        queue.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(queue)
    }

    /// Status counts over every record visible to the actor.
    pub fn summary(&self, actor: &ActorContext) -> Result<StatusSummary, LeaveServiceError> {
        let mut visible = Vec::new();
        for record in self.repository.all()? {
            let owner_department = self.directory.department_of(&record.user_id)?;
            if is_visible_to(actor, owner_department.as_deref(), &record) {
                visible.push(record);
            }
        }
        Ok(StatusSummary::from_records(&visible))
    }

    /// Calendar year balances default to when the caller does not name one.
    pub fn current_year(&self) -> i32 {
        self.clock.now().year()
    }

    pub fn submission_window(&self, date: Option<NaiveDate>) -> SubmissionWindow {
        self.validator.submission_window(date, self.clock.now())
    }
}

/// Error raised by the leave service.
#[derive(Debug, thiserror::Error)]
pub enum LeaveServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl From<ApprovalError> for LeaveServiceError {
    fn from(value: ApprovalError) -> Self {
        match value {
            ApprovalError::Authorization(error) => Self::Authorization(error),
            ApprovalError::Transition(error) => Self::Transition(error),
        }
    }
}
