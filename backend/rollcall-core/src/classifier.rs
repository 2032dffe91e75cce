// src/classifier.rs
use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::ClassificationContext;
use crate::record::RawAttendanceRecord;
use crate::status::Status;
use crate::time_parse::{minutes_of_day, parse_duration_minutes, parse_instant, parse_time_of_day};

/// Derives the attendance status of one record at `ctx.now`.
///
/// Rules are evaluated in order, first match wins:
///
/// 1. Shift start unparseable: `NotStarted`.
/// 2. `now` (minutes of day) before shift start: `NotStarted`.
/// 3. No clock-in and no positive logged work: `Missed`.
/// 4. Clocked in, with `diff = clock-in - shift start`:
///    - shift still running and logged work trails elapsed time by at least
///      the abandonment gap: `Abandoned`;
///    - `diff` above the late threshold: `Missed`;
///    - `diff` above grace: `Late`;
///    - otherwise `OnTime`.
/// 5. Logged work without a clock-in: `OnTime`.
///
/// Incomplete rows degrade toward `NotStarted`/`OnTime` instead of failing.
pub fn classify(record: &RawAttendanceRecord, ctx: &ClassificationContext) -> Status {
    let Some(shift_minutes) = parse_time_of_day(&record.shift_start) else {
        return Status::NotStarted;
    };
    if minutes_of_day(&ctx.now) < shift_minutes {
        return Status::NotStarted;
    }

    let start_minutes = parse_time_of_day(&record.start_time);
    let actual_minutes = parse_duration_minutes(&record.actual).filter(|m| *m > 0.0);

    match (start_minutes, actual_minutes) {
        (None, None) => Status::Missed,
        (Some(start), actual) => {
            if let Some(actual) = actual {
                if is_abandoned(record, actual, ctx) {
                    return Status::Abandoned;
                }
            }
            let diff = i64::from(start) - i64::from(shift_minutes);
            if diff > i64::from(ctx.thresholds.late_threshold_minutes) {
                Status::Missed
            } else if diff > i64::from(ctx.thresholds.grace_minutes) {
                Status::Late
            } else {
                Status::OnTime
            }
        }
        (None, Some(_)) => Status::OnTime,
    }
}

// Needs a full clock-in instant and a parseable shift end still ahead of now.
fn is_abandoned(record: &RawAttendanceRecord, actual_minutes: f64, ctx: &ClassificationContext) -> bool {
    let Some(clock_in) = parse_instant(&record.start_time) else {
        return false;
    };
    let Some(shift_end) = parse_time_of_day(&record.shift_end) else {
        return false;
    };
    if minutes_of_day(&ctx.now) >= shift_end {
        return false;
    }

    let shortfall = elapsed_minutes(clock_in, ctx.now) - actual_minutes;
    let abandoned = shortfall >= f64::from(ctx.thresholds.abandoned_gap_minutes);
    if abandoned {
        debug!(
            "{} abandoned: {:.1}m elapsed since clock-in, {:.1}m logged",
            record.member,
            elapsed_minutes(clock_in, ctx.now),
            actual_minutes
        );
    }
    abandoned
}

fn elapsed_minutes(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

/// Classifies every record of a batch, preserving order.
pub fn classify_all<'a>(
    records: &'a [RawAttendanceRecord],
    ctx: &ClassificationContext,
) -> Vec<(&'a RawAttendanceRecord, Status)> {
    let classified: Vec<_> = records.iter().map(|r| (r, classify(r, ctx))).collect();
    debug!("Classified {} records at {}", classified.len(), ctx.now);
    classified
}
