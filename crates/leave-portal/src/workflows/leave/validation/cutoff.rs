use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::super::domain::Session;

const DEFAULT_ALL_SESSIONS_UNTIL: u32 = 8 * 60 + 30;
const DEFAULT_AFTERNOON_UNTIL: u32 = 12 * 60 + 30;

/// Same-day submission cutoffs, in minutes since midnight.
///
/// Up to and including `all_sessions_until` every session may start today; up to and including
/// `afternoon_until` only the afternoon session remains; afterwards today is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCutoffs {
    pub all_sessions_until: u32,
    pub afternoon_until: u32,
}

impl Default for SessionCutoffs {
    fn default() -> Self {
        Self {
            all_sessions_until: DEFAULT_ALL_SESSIONS_UNTIL,
            afternoon_until: DEFAULT_AFTERNOON_UNTIL,
        }
    }
}

impl SessionCutoffs {
    /// Sessions that may still start on `date` given the current time.
    pub fn available_sessions(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<Session> {
        let today = now.date();
        if date < today {
            return Vec::new();
        }
        if date > today {
            return Session::ALL.to_vec();
        }

        let minutes = minutes_since_midnight(now);
        if minutes > self.afternoon_until {
            Vec::new()
        } else if minutes > self.all_sessions_until {
            vec![Session::Afternoon]
        } else {
            Session::ALL.to_vec()
        }
    }

    pub fn allows(&self, session: Session, date: NaiveDate, now: NaiveDateTime) -> bool {
        self.available_sessions(date, now).contains(&session)
    }

    /// Earliest start date a caller may pick: tomorrow once today's last cutoff has passed.
    pub fn min_start_date(&self, now: NaiveDateTime) -> NaiveDate {
        let today = now.date();
        if minutes_since_midnight(now) > self.afternoon_until {
            today + Duration::days(1)
        } else {
            today
        }
    }

    pub fn window(&self, date: Option<NaiveDate>, now: NaiveDateTime) -> SubmissionWindow {
        let min_start_date = self.min_start_date(now);
        let date = date.unwrap_or(min_start_date);
        SubmissionWindow {
            min_start_date,
            date,
            available_sessions: self.available_sessions(date, now),
        }
    }
}

/// What a request form may offer for a prospective start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionWindow {
    pub min_start_date: NaiveDate,
    pub date: NaiveDate,
    pub available_sessions: Vec<Session>,
}

fn minutes_since_midnight(now: NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}
