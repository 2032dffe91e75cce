// src/report.rs
use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use tracing::info;

use crate::aggregate::Summary;
use crate::classifier::classify;
use crate::config::ClassificationContext;
use crate::error::AppResult;
use crate::record::RawAttendanceRecord;
use crate::status::Status;
use crate::time_parse::{parse_calendar_date, parse_instant, parse_time_of_day};

const NOT_AVAILABLE: &str = "N/A";
const REPORT_TITLE: &str = "Workforce Attendance Report";

/// One table row with the computed status and display-ready cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    #[serde(skip)]
    pub index: usize,
    #[serde(skip)]
    pub status: Status,
    #[serde(rename = "Staff")]
    pub member: String,
    #[serde(rename = "Status")]
    pub status_label: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Shift Start")]
    pub shift_start: String,
    #[serde(rename = "Actual Start")]
    pub actual_start: String,
    #[serde(rename = "Late")]
    pub late: String,
    #[serde(rename = "Hours Worked")]
    pub hours_worked: String,
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.trim().to_string()
    }
}

/// Clock reading as `hh:mm AM/PM`.
pub fn format_clock(value: &str) -> String {
    let time = parse_instant(value).map(|dt| dt.time()).or_else(|| {
        parse_time_of_day(value)
            .and_then(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
    });
    match time {
        Some(t) => t.format("%I:%M %p").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Shift date as `dd-Mon-yy`, or the raw text if it is not a date.
pub fn format_short_date(value: &str) -> String {
    match parse_calendar_date(value) {
        Some(d) => d.format("%d-%b-%y").to_string(),
        None => or_na(value),
    }
}

pub fn classify_rows(records: &[RawAttendanceRecord], ctx: &ClassificationContext) -> Vec<ClassifiedRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| classified_row(index, record, classify(record, ctx)))
        .collect()
}

pub fn classified_row(index: usize, record: &RawAttendanceRecord, status: Status) -> ClassifiedRow {
    ClassifiedRow {
        index,
        status,
        member: or_na(&record.member),
        status_label: status.label().to_string(),
        date: format_short_date(&record.date),
        shift_start: format_clock(&record.shift_start),
        actual_start: format_clock(&record.start_time),
        late: or_na(&record.late),
        hours_worked: or_na(&record.actual),
    }
}

pub fn write_csv<W: Write>(rows: &[ClassifiedRow], writer: W) -> AppResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    info!("Wrote {} rows to CSV export", rows.len());
    Ok(())
}

pub fn to_json(summary: &Summary) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Plain-text report: title, generation instant, KPIs, then the table.
pub fn render_text(summary: &Summary, rows: &[ClassifiedRow], generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    let counts = &summary.counts;

    let _ = writeln!(out, "{}", REPORT_TITLE);
    let _ = writeln!(
        out,
        "Report Generated: {}",
        generated_at.format("%B %-d, %Y %-I:%M:%S %p")
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total Staff: {} | On Time: {} ({}%) | Late: {} | Absent: {} | Abandoned: {} | Not Started: {}",
        counts.total,
        counts.on_time,
        summary.on_time_percentage,
        counts.late,
        counts.missed,
        counts.abandoned,
        counts.not_started
    );
    let _ = writeln!(out);
    out.push_str(&render_table(rows));
    out
}

pub fn render_table(rows: &[ClassifiedRow]) -> String {
    let header = ["Staff", "Status", "Date", "Shift Start", "Actual Start", "Late", "Hours Worked"];
    let cells: Vec<[&str; 7]> = rows
        .iter()
        .map(|r| {
            [
                r.member.as_str(),
                r.status_label.as_str(),
                r.date.as_str(),
                r.shift_start.as_str(),
                r.actual_start.as_str(),
                r.late.as_str(),
                r.hours_worked.as_str(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule_refs: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_line(&mut out, &rule_refs, &widths);
    if cells.is_empty() {
        out.push_str("No employees found\n");
    }
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 17)
            .unwrap()
            .and_hms_opt(18, 5, 9)
            .unwrap()
    }

    fn sample() -> Vec<RawAttendanceRecord> {
        vec![
            RawAttendanceRecord::new("Ana")
                .date("2025-11-17")
                .shift_start("2025-11-17T09:00:00+10:00")
                .start_time("2025-11-17T09:12:00+10:00")
                .actual("7:48:00")
                .late("12"),
            RawAttendanceRecord::new("Ben").date("2025-11-17").shift_start("09:00"),
        ]
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock("2025-11-17T09:12:00+10:00"), "09:12 AM");
        assert_eq!(format_clock("17:30:00"), "05:30 PM");
        assert_eq!(format_clock(""), "N/A");
        assert_eq!(format_clock("later"), "N/A");
    }

    #[test]
    fn test_format_short_date() {
        assert_eq!(format_short_date("2025-11-17"), "17-Nov-25");
        assert_eq!(format_short_date("week 47"), "week 47");
        assert_eq!(format_short_date(""), "N/A");
    }

    #[test]
    fn test_classify_rows_uses_computed_status() {
        let rows = classify_rows(&sample(), &ClassificationContext::at(now()));
        assert_eq!(rows[0].status, Status::Late);
        assert_eq!(rows[0].status_label, "Late");
        assert_eq!(rows[0].shift_start, "09:00 AM");
        assert_eq!(rows[1].status, Status::Missed);
        assert_eq!(rows[1].actual_start, "N/A");
        assert_eq!(rows[1].late, "N/A");
        assert_eq!(rows[1].index, 1);
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let rows = classify_rows(&sample(), &ClassificationContext::at(now()));
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Staff,Status,Date,Shift Start,Actual Start,Late,Hours Worked")
        );
        assert_eq!(lines.next(), Some("Ana,Late,17-Nov-25,09:00 AM,09:12 AM,12,7:48:00"));
        assert_eq!(lines.next(), Some("Ben,Missed,17-Nov-25,09:00 AM,N/A,N/A,N/A"));
    }

    #[test]
    fn test_render_text_contains_kpis_and_rows() {
        let records = sample();
        let ctx = ClassificationContext::at(now());
        let summary = Summary::build(&records, &ctx);
        let rows = classify_rows(&records, &ctx);
        let text = render_text(&summary, &rows, now());

        assert!(text.starts_with(REPORT_TITLE));
        assert!(text.contains("Report Generated: November 17, 2025 6:05:09 PM"));
        assert!(text.contains("Total Staff: 2 | On Time: 0 (0.0%) | Late: 1 | Absent: 1"));
        assert!(text.lines().any(|l| l.starts_with("Ana") && l.contains("Late")));
    }

    #[test]
    fn test_render_table_empty() {
        let table = render_table(&[]);
        assert!(table.contains("No employees found"));
    }

    #[test]
    fn test_to_json_shape() {
        let summary = Summary::build(&sample(), &ClassificationContext::at(now()));
        let json: serde_json::Value = serde_json::from_str(&to_json(&summary).unwrap()).unwrap();
        assert_eq!(json["counts"]["total"], 2);
        assert_eq!(json["on_time_percentage"], "0.0");
        assert_eq!(json["top_late"][0]["member"], "Ana");
    }
}
