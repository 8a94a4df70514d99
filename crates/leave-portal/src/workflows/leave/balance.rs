use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::domain::{LeaveRecord, LeaveStatus, LeaveType, UnknownVariant};

/// Annual allowance per leave type, loaded once at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTypeLimits {
    limits: BTreeMap<LeaveType, f64>,
}

impl Default for LeaveTypeLimits {
    fn default() -> Self {
        Self::from_pairs([
            (LeaveType::Casual, 12.0),
            (LeaveType::Duty, 15.0),
            (LeaveType::Vacation, 30.0),
            (LeaveType::Maternity, 180.0),
            (LeaveType::Compensatory, 10.0),
        ])
    }
}

impl LeaveTypeLimits {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (LeaveType, f64)>,
    {
        Self {
            limits: pairs.into_iter().collect(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LeaveLimitsError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a `leave_type,limit` CSV table. Limits must be non-negative multiples of half a day.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LeaveLimitsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut limits = BTreeMap::new();

        for row in csv_reader.deserialize::<LimitRow>() {
            let row = row?;
            let leave_type: LeaveType = row.leave_type.parse()?;
            if !row.limit.is_finite() || row.limit < 0.0 || (row.limit * 2.0).fract() != 0.0 {
                return Err(LeaveLimitsError::InvalidLimit {
                    leave_type,
                    limit: row.limit,
                });
            }
            limits.insert(leave_type, row.limit);
        }

        Ok(Self { limits })
    }

    pub fn limit_for(&self, leave_type: LeaveType) -> Option<f64> {
        self.limits.get(&leave_type).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeaveType, f64)> + '_ {
        self.limits.iter().map(|(kind, limit)| (*kind, *limit))
    }
}

#[derive(Debug, Deserialize)]
struct LimitRow {
    leave_type: String,
    limit: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LeaveLimitsError {
    #[error("failed to read leave limit table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid leave limit CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    UnknownType(#[from] UnknownVariant),
    #[error("limit {limit} for {leave_type} must be a non-negative multiple of 0.5")]
    InvalidLimit { leave_type: LeaveType, limit: f64 },
}

/// Usage of one leave type within a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub limit: f64,
    pub used: f64,
    pub remaining: f64,
}

impl LeaveBalance {
    fn new(limit: f64, used: f64) -> Self {
        Self {
            limit,
            used,
            remaining: (limit - used).max(0.0),
        }
    }

    /// Usage beyond the allowance; reported, never prevented here.
    pub fn overdrawn(&self) -> bool {
        self.used > self.limit
    }
}

/// Replay approved records starting in `year` into per-type balances.
///
/// Every type in `limits` is reported; approved usage of an unconfigured type shows up with a
/// zero limit.
pub fn compute_balances<'a, I>(
    records: I,
    year: i32,
    limits: &LeaveTypeLimits,
) -> BTreeMap<LeaveType, LeaveBalance>
where
    I: IntoIterator<Item = &'a LeaveRecord>,
{
    let mut used: BTreeMap<LeaveType, f64> = limits.iter().map(|(kind, _)| (kind, 0.0)).collect();

    for record in records
        .into_iter()
        .filter(|record| record.status == LeaveStatus::Approved)
        .filter(|record| record.from_date.year() == year)
    {
        *used.entry(record.leave_type).or_insert(0.0) += record.leave_value;
    }

    used.into_iter()
        .map(|(kind, used)| {
            let limit = limits.limit_for(kind).unwrap_or(0.0);
            (kind, LeaveBalance::new(limit, used))
        })
        .collect()
}
