use chrono::{Local, NaiveDateTime};

use super::domain::{LeaveId, LeaveRecord, UserId};

/// Storage abstraction over the document store holding leave records.
pub trait LeaveRepository: Send + Sync {
    fn insert(&self, record: LeaveRecord) -> Result<LeaveRecord, RepositoryError>;
    fn update(&self, record: LeaveRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeaveId) -> Result<Option<LeaveRecord>, RepositoryError>;
    fn for_user(&self, user_id: &UserId) -> Result<Vec<LeaveRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<LeaveRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of organizational data owned by the identity provider.
pub trait Directory: Send + Sync {
    fn department_of(&self, user_id: &UserId) -> Result<Option<String>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Source of the current local time, the reference for same-day cutoffs and timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
