use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::leave::balance::LeaveTypeLimits;
use crate::workflows::leave::domain::{
    ActorContext, LeaveId, LeaveRecord, LeaveRequestDraft, LeaveStatus, LeaveType, Role, Session,
    UserId,
};
use crate::workflows::leave::repository::{
    Directory, DirectoryError, FixedClock, LeaveRepository, RepositoryError,
};
use crate::workflows::leave::service::LeaveService;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
}

pub(super) fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub(super) fn at(hour: u32, minute: u32) -> NaiveDateTime {
    today().and_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn staff(user: &str) -> ActorContext {
    let department = match user {
        "carol" => "EEE",
        _ => "CSE",
    };
    ActorContext::new(user, Role::Staff, Some(department))
}

pub(super) fn hod(department: &str) -> ActorContext {
    ActorContext::new(
        format!("hod-{}", department.to_ascii_lowercase()),
        Role::Hod,
        Some(department),
    )
}

pub(super) fn principal() -> ActorContext {
    ActorContext::new("principal", Role::Principal, None)
}

pub(super) fn director() -> ActorContext {
    ActorContext::new("director", Role::Director, None)
}

pub(super) fn admin() -> ActorContext {
    ActorContext::new("admin", Role::Admin, None)
}

pub(super) fn draft(
    leave_type: LeaveType,
    from_date: NaiveDate,
    to_date: NaiveDate,
    session: Session,
) -> LeaveRequestDraft {
    LeaveRequestDraft {
        leave_type,
        from_date,
        to_date,
        session,
        reason: "Family function".to_string(),
        description: None,
    }
}

pub(super) fn record(
    id: &str,
    user: &str,
    leave_type: LeaveType,
    from_date: NaiveDate,
    to_date: NaiveDate,
    session: Session,
    status: LeaveStatus,
) -> LeaveRecord {
    let window = crate::workflows::leave::domain::LeaveWindow::new(from_date, to_date, session);
    LeaveRecord {
        id: LeaveId(id.to_string()),
        user_id: UserId(user.to_string()),
        leave_type,
        from_date,
        to_date,
        session,
        leave_value: window.leave_value(),
        status,
        recommended_by: None,
        reason: "Seeded".to_string(),
        description: None,
        created_at: at(7, 0),
        updated_at: at(7, 0),
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<BTreeMap<LeaveId, LeaveRecord>>,
}

impl MemoryRepository {
    pub(super) fn seeded(records: Vec<LeaveRecord>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("repository mutex poisoned");
            for record in records {
                guard.insert(record.id.clone(), record);
            }
        }
        repository
    }
}

impl LeaveRepository for MemoryRepository {
    fn insert(&self, record: LeaveRecord) -> Result<LeaveRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: LeaveRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &LeaveId) -> Result<Option<LeaveRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<LeaveRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<LeaveRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl LeaveRepository for UnavailableRepository {
    fn insert(&self, _record: LeaveRecord) -> Result<LeaveRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn update(&self, _record: LeaveRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn fetch(&self, _id: &LeaveId) -> Result<Option<LeaveRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn for_user(&self, _user_id: &UserId) -> Result<Vec<LeaveRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn all(&self) -> Result<Vec<LeaveRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }
}

pub(super) struct MemoryDirectory {
    departments: HashMap<UserId, String>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        let departments = [("alice", "CSE"), ("bob", "CSE"), ("carol", "EEE")]
            .into_iter()
            .map(|(user, department)| (UserId(user.to_string()), department.to_string()))
            .collect();
        Self { departments }
    }
}

impl Directory for MemoryDirectory {
    fn department_of(&self, user_id: &UserId) -> Result<Option<String>, DirectoryError> {
        Ok(self.departments.get(user_id).cloned())
    }
}

pub(super) type TestService = LeaveService<MemoryRepository, MemoryDirectory>;

pub(super) fn build_service_at(
    now: NaiveDateTime,
    seed: Vec<LeaveRecord>,
) -> (Arc<TestService>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::seeded(seed));
    let service = LeaveService::new(
        repository.clone(),
        Arc::new(MemoryDirectory::default()),
        LeaveTypeLimits::default(),
    )
    .with_clock(Arc::new(FixedClock(now)));
    (Arc::new(service), repository)
}

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryRepository>) {
    build_service_at(at(8, 0), Vec::new())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json body")
}
