// src/ingest.rs
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::record::RawAttendanceRecord;

// --- Header Aliases ---
//
// Hubstaff-style exports are not consistent about column naming. The first
// alias holding a non-empty value wins.

const ORGANIZATION: &[&str] = &["Organization", "organization"];
const TIME_ZONE: &[&str] = &["Time zone", "Timezone", "timezone"];
const DATE: &[&str] = &["Date", "date"];
const MEMBER: &[&str] = &["Member", "member", "Employee", "Name"];
const STATUS: &[&str] = &["Status", "status"];
const SHIFT_START: &[&str] = &["Shift start", "ShiftStart", "shift_start"];
const SHIFT_STOP: &[&str] = &["Shift stop", "ShiftStop", "shift_stop", "Shift end", "shift_end"];
const START_TIME: &[&str] = &["Start time", "StartTime", "start_time"];
const REQUIRED: &[&str] = &["Required", "required"];
const ACTUAL: &[&str] = &["Actual", "actual"];
const LATE: &[&str] = &["Late", "late"];

struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();
        Self { positions }
    }

    fn pick(&self, row: &csv::StringRecord, aliases: &[&str]) -> String {
        aliases
            .iter()
            .filter_map(|alias| self.positions.get(*alias))
            .filter_map(|&i| row.get(i))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Decodes a CSV export into raw records.
///
/// Missing columns populate as `""`. Rows whose fields are all blank are
/// skipped. A file without at least one data row is an ingestion error.
pub fn parse_csv(text: &str) -> AppResult<Vec<RawAttendanceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.trim().as_bytes());

    let headers = reader.headers()?.clone();
    debug!("CSV headers: {:?}", headers);
    let index = HeaderIndex::new(&headers);

    let mut records = Vec::new();
    let mut saw_row = false;
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        saw_row = true;
        if row.iter().all(|f| f.trim().is_empty()) {
            debug!("Skipping blank row {}", i + 1);
            continue;
        }
        records.push(RawAttendanceRecord {
            organization: index.pick(&row, ORGANIZATION),
            time_zone: index.pick(&row, TIME_ZONE),
            date: index.pick(&row, DATE),
            member: index.pick(&row, MEMBER),
            status: index.pick(&row, STATUS),
            shift_start: index.pick(&row, SHIFT_START),
            shift_end: index.pick(&row, SHIFT_STOP),
            start_time: index.pick(&row, START_TIME),
            required: index.pick(&row, REQUIRED),
            actual: index.pick(&row, ACTUAL),
            late: index.pick(&row, LATE),
        });
    }

    if !saw_row {
        return Err(AppError::EmptyDataset(
            "CSV file must contain at least a header row and one data row".to_string(),
        ));
    }
    if records.is_empty() {
        return Err(AppError::EmptyDataset(
            "No valid data rows found in CSV file".to_string(),
        ));
    }

    info!("Parsed {} attendance records from CSV", records.len());
    Ok(records)
}

/// Reads and decodes an export file, dispatching on its extension.
pub async fn load_file(path: &Path) -> AppResult<Vec<RawAttendanceRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            info!("Loading attendance export {}", path.display());
            let text = tokio::fs::read_to_string(path).await?;
            parse_csv(&text)
        }
        other => {
            warn!("Rejecting {}: unsupported extension '{}'", path.display(), other);
            Err(AppError::UnsupportedFormat(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ))
        }
    }
}

// --- Dataset ---

/// The batch currently under analysis.
///
/// Every change is a whole-collection swap: a new upload replaces the batch
/// outright and deleting a row rebuilds it without that index.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<RawAttendanceRecord>,
}

impl Dataset {
    pub fn new(records: Vec<RawAttendanceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RawAttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replaces the whole batch, returning the previous one.
    pub fn replace(&mut self, batch: Vec<RawAttendanceRecord>) -> Vec<RawAttendanceRecord> {
        info!("Replacing dataset: {} -> {} records", self.records.len(), batch.len());
        std::mem::replace(&mut self.records, batch)
    }

    pub fn delete_row(&mut self, index: usize) -> AppResult<RawAttendanceRecord> {
        if index >= self.records.len() {
            return Err(AppError::RowOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let mut next = self.records.clone();
        let removed = next.remove(index);
        self.records = next;
        debug!("Deleted row {} ({})", index, removed.member);
        Ok(removed)
    }

    /// Case-insensitive substring match on `member`.
    pub fn search(&self, query: &str) -> Vec<(usize, &RawAttendanceRecord)> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.member.to_lowercase().contains(&needle))
            .collect()
    }

    /// Decodes `path` and swaps it in. On failure the current batch is kept.
    pub async fn try_reload(&mut self, path: &Path) -> AppResult<usize> {
        let batch = load_file(path).await?;
        let len = batch.len();
        self.replace(batch);
        Ok(len)
    }
}
