// src/lib.rs
//! Attendance classification for shift exports.
//!
//! Raw rows come in through [`ingest`], each row is classified against a
//! [`config::ClassificationContext`] by [`classifier::classify`], and
//! [`aggregate`] folds the results into the dashboard summaries that
//! [`report`] renders.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod record;
pub mod report;
pub mod status;
pub mod time_parse;


pub use aggregate::{DailyTrend, DepartmentCount, LateArrival, StatusCounts, Summary};
pub use classifier::{classify, classify_all};
pub use config::{ClassificationContext, ThresholdConfig, ThresholdPreset};
pub use error::{AppError, AppResult};
pub use ingest::Dataset;
pub use record::RawAttendanceRecord;
pub use status::{Status, StatusDisplay};
