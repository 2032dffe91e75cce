// src/record.rs
use serde::{Deserialize, Serialize};

/// One row of an uploaded attendance export.
///
/// Every field is a raw string exactly as it appeared in the file (trimmed).
/// Absent columns are stored as `""`, never as a missing value, so parsers
/// treat the empty string as "no data".
///
/// `status` and `late` are advisory columns written by the upstream tool.
/// They can be stale relative to the evaluation instant and are only ever
/// displayed, never used to decide a [`crate::status::Status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendanceRecord {
    pub organization: String,
    pub time_zone: String,
    pub date: String,
    pub member: String,
    pub status: String,
    pub shift_start: String,
    pub shift_end: String,
    pub start_time: String,
    pub required: String,
    pub actual: String,
    pub late: String,
}

impl RawAttendanceRecord {
    pub fn new(member: &str) -> Self {
        Self {
            member: member.to_string(),
            ..Default::default()
        }
    }

    pub fn organization(mut self, org: &str) -> Self {
        self.organization = org.to_string();
        self
    }
    pub fn date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }
    pub fn shift(mut self, start: &str, end: &str) -> Self {
        self.shift_start = start.to_string();
        self.shift_end = end.to_string();
        self
    }
    pub fn shift_start(mut self, start: &str) -> Self {
        self.shift_start = start.to_string();
        self
    }
    pub fn start_time(mut self, start: &str) -> Self {
        self.start_time = start.to_string();
        self
    }
    pub fn actual(mut self, actual: &str) -> Self {
        self.actual = actual.to_string();
        self
    }
    pub fn late(mut self, late: &str) -> Self {
        self.late = late.to_string();
        self
    }
}
