//! Import of leave records from a CSV export of the portal's document store.
//!
//! Stored `leaveValue` columns are ignored; the value is re-derived from dates and session.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

use super::domain::{
    LeaveId, LeaveRecord, LeaveStatus, LeaveType, LeaveWindow, Role, Session, UnknownVariant,
    UserId,
};
use super::validation::{check_shape, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum LeaveImportError {
    #[error("failed to read leave export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid leave CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Field {
        row: usize,
        #[source]
        source: UnknownVariant,
    },
    #[error("row {row}: invalid date '{value}'")]
    Date { row: usize, value: String },
    #[error("row {row}: {source}")]
    Window {
        row: usize,
        #[source]
        source: ValidationError,
    },
}

pub struct LeaveRecordImporter;

impl LeaveRecordImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LeaveRecord>, LeaveImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<LeaveRecord>, LeaveImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, row) in csv_reader.deserialize::<LeaveRow>().enumerate() {
            let row = row?;
            records.push(row.into_record(index + 1)?);
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct LeaveRow {
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "type")]
    leave_type: String,
    #[serde(rename = "fromDate")]
    from_date: String,
    #[serde(rename = "toDate")]
    to_date: String,
    session: String,
    status: String,
    #[serde(
        rename = "recommendedBy",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    recommended_by: Option<String>,
    #[serde(default)]
    reason: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(rename = "createdAt", default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
    #[serde(rename = "updatedAt", default, deserialize_with = "empty_string_as_none")]
    updated_at: Option<String>,
}

impl LeaveRow {
    fn into_record(self, row: usize) -> Result<LeaveRecord, LeaveImportError> {
        let field = |source: UnknownVariant| LeaveImportError::Field { row, source };
        let date = |value: &str| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| LeaveImportError::Date {
                row,
                value: value.to_string(),
            })
        };

        let leave_type: LeaveType = self.leave_type.parse().map_err(field)?;
        let session: Session = self.session.parse().map_err(field)?;
        let status: LeaveStatus = self.status.parse().map_err(field)?;
        let recommended_by = self
            .recommended_by
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()
            .map_err(field)?;
        let from_date = date(&self.from_date)?;
        let to_date = date(&self.to_date)?;
        let window = LeaveWindow::new(from_date, to_date, session);
        check_shape(&window).map_err(|source| LeaveImportError::Window { row, source })?;

        let timestamp = |value: &str| {
            parse_datetime(value).ok_or_else(|| LeaveImportError::Date {
                row,
                value: value.to_string(),
            })
        };
        let created_at = match self.created_at.as_deref() {
            Some(value) => timestamp(value)?,
            None => from_date.and_time(NaiveTime::default()),
        };
        let updated_at = match self.updated_at.as_deref() {
            Some(value) => timestamp(value)?,
            None => created_at,
        };

        Ok(LeaveRecord {
            id: LeaveId(self.id),
            user_id: UserId(self.user_id),
            leave_type,
            from_date,
            to_date,
            session,
            leave_value: window.leave_value(),
            status,
            recommended_by,
            reason: self.reason,
            description: self.description,
            created_at,
            updated_at,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
