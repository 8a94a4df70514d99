use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored leave records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaveId(pub String);

/// Identifier of the user owning (or acting on) a leave record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for LeaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leave categories offered by the portal.
///
/// The serialized form is the display label stored by the portal ("Casual Leave"); the short
/// name is accepted as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeaveType {
    #[serde(rename = "Casual Leave", alias = "Casual")]
    Casual,
    #[serde(rename = "Duty Leave", alias = "Duty")]
    Duty,
    #[serde(rename = "Vacation Leave", alias = "Vacation")]
    Vacation,
    #[serde(rename = "Maternity Leave", alias = "Maternity")]
    Maternity,
    #[serde(rename = "Compensatory Leave", alias = "Compensatory")]
    Compensatory,
}

impl LeaveType {
    pub const ALL: [LeaveType; 5] = [
        LeaveType::Casual,
        LeaveType::Duty,
        LeaveType::Vacation,
        LeaveType::Maternity,
        LeaveType::Compensatory,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LeaveType::Casual => "Casual Leave",
            LeaveType::Duty => "Duty Leave",
            LeaveType::Vacation => "Vacation Leave",
            LeaveType::Maternity => "Maternity Leave",
            LeaveType::Compensatory => "Compensatory Leave",
        }
    }

    const fn short_name(self) -> &'static str {
        match self {
            LeaveType::Casual => "casual",
            LeaveType::Duty => "duty",
            LeaveType::Vacation => "vacation",
            LeaveType::Maternity => "maternity",
            LeaveType::Compensatory => "compensatory",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeaveType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        LeaveType::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(needle)
                    || kind.short_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownVariant::new("leave type", value))
    }
}

/// Portion of the day covered by a leave window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    #[serde(rename = "Full Day", alias = "FullDay")]
    FullDay,
    Forenoon,
    Afternoon,
}

impl Session {
    pub const ALL: [Session; 3] = [Session::FullDay, Session::Forenoon, Session::Afternoon];

    pub const fn label(self) -> &'static str {
        match self {
            Session::FullDay => "Full Day",
            Session::Forenoon => "Forenoon",
            Session::Afternoon => "Afternoon",
        }
    }

    pub const fn is_half_day(self) -> bool {
        matches!(self, Session::Forenoon | Session::Afternoon)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Session {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full day" | "fullday" | "full_day" => Ok(Session::FullDay),
            "forenoon" => Ok(Session::Forenoon),
            "afternoon" => Ok(Session::Afternoon),
            _ => Err(UnknownVariant::new("session", value)),
        }
    }
}

/// Approval status of a leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveStatus {
    Pending,
    Recommended,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Recommended => "Recommended",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        }
    }

    /// No transition leaves `Approved` or `Rejected`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeaveStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "recommended" => Ok(LeaveStatus::Recommended),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            _ => Err(UnknownVariant::new("status", value)),
        }
    }
}

/// Organizational role supplied by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Staff,
    #[serde(rename = "HOD", alias = "Hod")]
    Hod,
    Principal,
    Director,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Staff => "Staff",
            Role::Hod => "HOD",
            Role::Principal => "Principal",
            Role::Director => "Director",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "hod" => Ok(Role::Hod),
            "principal" => Ok(Role::Principal),
            "director" => Ok(Role::Director),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownVariant::new("role", value)),
        }
    }
}

/// Raised when a textual enum value does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Identity of the caller as supplied by the external directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
}

impl ActorContext {
    pub fn new(user_id: impl Into<String>, role: Role, department: Option<&str>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
            department: department.map(str::to_string),
        }
    }
}

/// Inclusive date range plus session, the unit the validator reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWindow {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub session: Session,
}

impl LeaveWindow {
    pub fn new(from_date: NaiveDate, to_date: NaiveDate, session: Session) -> Self {
        Self {
            from_date,
            to_date,
            session,
        }
    }

    /// Allowance consumed by the window: half a day for a half-day session, otherwise the
    /// inclusive day count (zero for an inverted range).
    pub fn leave_value(&self) -> f64 {
        if self.session.is_half_day() {
            return 0.5;
        }

        let days = (self.to_date - self.from_date).num_days() + 1;
        days.max(0) as f64
    }

    /// Two windows conflict when their dates intersect and their sessions are not the two
    /// disjoint halves of a day.
    pub fn overlaps(&self, other: &LeaveWindow) -> bool {
        let dates_intersect = other.from_date <= self.to_date && other.to_date >= self.from_date;
        if !dates_intersect {
            return false;
        }

        self.session == Session::FullDay
            || other.session == Session::FullDay
            || self.session == other.session
    }
}

/// Caller-supplied content of a new or edited leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequestDraft {
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub session: Session,
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl LeaveRequestDraft {
    pub fn window(&self) -> LeaveWindow {
        LeaveWindow::new(self.from_date, self.to_date, self.session)
    }
}

/// Stored leave record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub id: LeaveId,
    pub user_id: UserId,
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub session: Session,
    pub leave_value: f64,
    pub status: LeaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_by: Option<Role>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LeaveRecord {
    pub fn window(&self) -> LeaveWindow {
        LeaveWindow::new(self.from_date, self.to_date, self.session)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
