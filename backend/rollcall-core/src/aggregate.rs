// src/aggregate.rs
//
// Summaries folded from (record, computed status) pairs. Nothing here reads
// the advisory `status` column; lateness for ranking comes from the `late`
// column only after the computed status says the row is late.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::classifier::classify_all;
use crate::config::ClassificationContext;
use crate::record::RawAttendanceRecord;
use crate::status::Status;
use crate::time_parse::{parse_calendar_date, parse_duration_minutes};

pub const TOP_LATE_LIMIT: usize = 10;

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading-integer regex"));

type Classified<'a> = (&'a RawAttendanceRecord, Status);

// --- Status Counts ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub on_time: usize,
    pub late: usize,
    pub missed: usize,
    pub abandoned: usize,
    pub not_started: usize,
}

impl StatusCounts {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Status>,
    {
        let mut counts = Self::default();
        for status in statuses {
            counts.total += 1;
            match status {
                Status::OnTime => counts.on_time += 1,
                Status::Late => counts.late += 1,
                Status::Missed => counts.missed += 1,
                Status::Abandoned => counts.abandoned += 1,
                Status::NotStarted => counts.not_started += 1,
            }
        }
        counts
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::OnTime => self.on_time,
            Status::Late => self.late,
            Status::Missed => self.missed,
            Status::Abandoned => self.abandoned,
            Status::NotStarted => self.not_started,
        }
    }

    /// Missed plus not started.
    pub fn absent(&self) -> usize {
        Status::ALL
            .iter()
            .filter(|s| s.is_absent())
            .map(|s| self.count(*s))
            .sum()
    }

    /// On-time share of the batch with one decimal, or `"0"` for an empty batch.
    pub fn on_time_percentage(&self) -> String {
        if self.total == 0 {
            return "0".to_string();
        }
        let pct = Decimal::from(self.on_time) * dec!(100) / Decimal::from(self.total);
        let mut rounded = pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(1);
        rounded.to_string()
    }
}

// --- Trend by Date ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTrend {
    pub date: String,
    pub on_time: usize,
    pub late: usize,
    /// Every status other than on time and late.
    pub absent: usize,
}

/// Groups by the raw `date` string and orders groups by calendar date.
///
/// Groups whose date does not parse come last, in order of first appearance.
pub fn trend_by_date(classified: &[Classified<'_>]) -> Vec<DailyTrend> {
    let mut groups: Vec<DailyTrend> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (record, status) in classified {
        let slot = *index.entry(record.date.as_str()).or_insert_with(|| {
            groups.push(DailyTrend {
                date: record.date.clone(),
                on_time: 0,
                late: 0,
                absent: 0,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        match status {
            Status::OnTime => group.on_time += 1,
            Status::Late => group.late += 1,
            _ => group.absent += 1,
        }
    }

    groups.sort_by_key(|g| date_sort_key(&g.date));
    debug!("Built attendance trend over {} dates", groups.len());
    groups
}

fn date_sort_key(date: &str) -> (bool, Option<NaiveDate>) {
    let parsed = parse_calendar_date(date);
    (parsed.is_none(), parsed)
}

// --- Department Breakdown ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub organization: String,
    pub count: usize,
}

/// Record count per `organization`, in order of first appearance.
pub fn count_by_department(records: &[RawAttendanceRecord]) -> Vec<DepartmentCount> {
    let mut departments: Vec<DepartmentCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.organization.as_str()) {
            Some(&i) => departments[i].count += 1,
            None => {
                index.insert(record.organization.as_str(), departments.len());
                departments.push(DepartmentCount {
                    organization: record.organization.clone(),
                    count: 1,
                });
            }
        }
    }
    departments
}

// --- Top Late Arrivals ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LateArrival {
    pub member: String,
    pub minutes: i64,
}

/// Reads the advisory `late` column as whole minutes.
///
/// `H:MM:SS` is floored to minutes, otherwise a leading integer is taken
/// (`"45 min"` is 45). Anything else is 0.
pub fn late_minutes(value: &str) -> i64 {
    if let Some(minutes) = parse_duration_minutes(value) {
        return minutes.floor() as i64;
    }
    LEADING_INT_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// The ten latest rows with a computed `Late` status and a non-empty `late`
/// column, latest first. Ties keep input order.
pub fn top_late_arrivals(classified: &[Classified<'_>]) -> Vec<LateArrival> {
    let mut late: Vec<LateArrival> = classified
        .iter()
        .filter(|(record, status)| *status == Status::Late && !record.late.trim().is_empty())
        .map(|(record, _)| LateArrival {
            member: record.member.clone(),
            minutes: late_minutes(&record.late),
        })
        .collect();

    late.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    late.truncate(TOP_LATE_LIMIT);
    late
}

// --- Summary ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub counts: StatusCounts,
    pub on_time_percentage: String,
    pub trend: Vec<DailyTrend>,
    pub departments: Vec<DepartmentCount>,
    pub top_late: Vec<LateArrival>,
}

impl Summary {
    pub fn build(records: &[RawAttendanceRecord], ctx: &ClassificationContext) -> Self {
        let classified = classify_all(records, ctx);
        Self::from_classified(records, &classified)
    }

    pub fn from_classified(records: &[RawAttendanceRecord], classified: &[Classified<'_>]) -> Self {
        let counts = StatusCounts::from_statuses(classified.iter().map(|(_, s)| *s));
        Self {
            on_time_percentage: counts.on_time_percentage(),
            counts,
            trend: trend_by_date(classified),
            departments: count_by_department(records),
            top_late: top_late_arrivals(classified),
        }
    }
}
