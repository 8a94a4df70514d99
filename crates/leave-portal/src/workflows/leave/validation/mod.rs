mod cutoff;

pub use cutoff::{SessionCutoffs, SubmissionWindow};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    LeaveId, LeaveRecord, LeaveRequestDraft, LeaveStatus, LeaveWindow, Session, UserId,
};

/// Rejection reasons raised before a leave window is persisted. None of them are retryable
/// without changing the candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a reason is required")]
    MissingReason,
    #[error("end date {to_date} is before start date {from_date}")]
    OrderingInvalid {
        from_date: NaiveDate,
        to_date: NaiveDate,
    },
    #[error("{session} leave must start and end on the same day")]
    HalfDaySpansMultipleDays { session: Session },
    #[error("cannot apply for leave in the past ({from_date} is before {today})")]
    PastDate { from_date: NaiveDate, today: NaiveDate },
    #[error("cannot apply for {session} on {date} at this time")]
    SessionUnavailable { session: Session, date: NaiveDate },
    #[error("overlaps existing leave {conflicting}")]
    Overlap { conflicting: LeaveId },
}

/// Ordering and half-day span checks, the only ones that hold for stored records too.
pub fn check_shape(window: &LeaveWindow) -> Result<(), ValidationError> {
    if window.to_date < window.from_date {
        return Err(ValidationError::OrderingInvalid {
            from_date: window.from_date,
            to_date: window.to_date,
        });
    }

    if window.session.is_half_day() && window.from_date != window.to_date {
        return Err(ValidationError::HalfDaySpansMultipleDays {
            session: window.session,
        });
    }

    Ok(())
}

/// Window proposed for a user, as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveCandidate {
    pub user_id: UserId,
    pub window: LeaveWindow,
}

/// Accepted candidate plus the allowance it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acceptance {
    pub window: LeaveWindow,
    pub leave_value: f64,
}

/// Pure eligibility and conflict checks.
#[derive(Debug, Clone, Default)]
pub struct LeaveValidator {
    cutoffs: SessionCutoffs,
}

impl LeaveValidator {
    pub fn new(cutoffs: SessionCutoffs) -> Self {
        Self { cutoffs }
    }

    pub fn validate(
        &self,
        candidate: &LeaveCandidate,
        existing: &[LeaveRecord],
        now: NaiveDateTime,
        exclude: Option<&LeaveId>,
    ) -> Result<Acceptance, ValidationError> {
        let window = candidate.window;

        check_shape(&window)?;

        let today = now.date();
        if window.from_date < today {
            return Err(ValidationError::PastDate {
                from_date: window.from_date,
                today,
            });
        }

        if window.from_date == today && !self.cutoffs.allows(window.session, today, now) {
            return Err(ValidationError::SessionUnavailable {
                session: window.session,
                date: today,
            });
        }

        if let Some(conflict) = find_conflict(candidate, existing, exclude) {
            return Err(ValidationError::Overlap {
                conflicting: conflict.id.clone(),
            });
        }

        Ok(Acceptance {
            window,
            leave_value: window.leave_value(),
        })
    }

    /// Validate a full request payload, including the free-text fields.
    pub fn validate_draft(
        &self,
        user_id: &UserId,
        draft: &LeaveRequestDraft,
        existing: &[LeaveRecord],
        now: NaiveDateTime,
        exclude: Option<&LeaveId>,
    ) -> Result<Acceptance, ValidationError> {
        if draft.reason.trim().is_empty() {
            return Err(ValidationError::MissingReason);
        }

        let candidate = LeaveCandidate {
            user_id: user_id.clone(),
            window: draft.window(),
        };
        self.validate(&candidate, existing, now, exclude)
    }

    pub fn submission_window(
        &self,
        date: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> SubmissionWindow {
        self.cutoffs.window(date, now)
    }
}

fn find_conflict<'a>(
    candidate: &LeaveCandidate,
    existing: &'a [LeaveRecord],
    exclude: Option<&LeaveId>,
) -> Option<&'a LeaveRecord> {
    existing
        .iter()
        .filter(|record| record.is_owned_by(&candidate.user_id))
        .filter(|record| record.status != LeaveStatus::Rejected)
        .filter(|record| exclude != Some(&record.id))
        .find(|record| record.window().overlaps(&candidate.window))
}
