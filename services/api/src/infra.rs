use chrono::NaiveDate;
use leave_portal::workflows::leave::{
    Clock, Directory, DirectoryError, LeaveId, LeaveRecord, LeaveRepository, LeaveTypeLimits,
    RepositoryError, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) limits: Arc<LeaveTypeLimits>,
    pub(crate) clock: Arc<dyn Clock>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeaveRepository {
    records: Arc<Mutex<HashMap<LeaveId, LeaveRecord>>>,
}

impl InMemoryLeaveRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<LeaveId, LeaveRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl LeaveRepository for InMemoryLeaveRepository {
    fn insert(&self, record: LeaveRecord) -> Result<LeaveRecord, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: LeaveRecord) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LeaveId) -> Result<Option<LeaveRecord>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<LeaveRecord>, RepositoryError> {
        Ok(self
            .guard()?
            .values()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<LeaveRecord>, RepositoryError> {
        Ok(self.guard()?.values().cloned().collect())
    }
}

/// Static user-to-department table standing in for the identity provider.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryDirectory {
    departments: HashMap<UserId, String>,
}

impl InMemoryDirectory {
    pub(crate) fn from_entries<I, U, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (U, D)>,
        U: Into<String>,
        D: Into<String>,
    {
        Self {
            departments: entries
                .into_iter()
                .map(|(user, department)| (UserId(user.into()), department.into()))
                .collect(),
        }
    }

    pub(crate) fn sample() -> Self {
        Self::from_entries([
            ("asha", "CSE"),
            ("ravi", "CSE"),
            ("meera", "EEE"),
            ("hod-cse", "CSE"),
            ("hod-eee", "EEE"),
        ])
    }
}

impl Directory for InMemoryDirectory {
    fn department_of(&self, user_id: &UserId) -> Result<Option<String>, DirectoryError> {
        Ok(self.departments.get(user_id).cloned())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
