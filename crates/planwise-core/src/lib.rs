//! # planwise-core
//!
//! Core domain model and collaborator traits for the planwise scheduling
//! engine.
//!
//! This crate provides:
//! - Domain types: [`Task`], [`TaskStatus`], [`WorkCalendar`]
//! - Collaborator traits: [`TaskRepository`], [`HolidayOracle`], [`Clock`]
//! - Error types and the shared floating-point tolerance helpers
//!
//! ## Example
//!
//! ```rust
//! use planwise_core::{Task, TaskStatus};
//! use chrono::NaiveDate;
//!
//! let task = Task::new("write report")
//!     .priority(80)
//!     .estimated_hours(12.0)
//!     .deadline(NaiveDate::from_ymd_opt(2025, 10, 31).unwrap().and_hms_opt(18, 0, 0).unwrap());
//!
//! assert!(task.is_schedulable(false));
//! assert_eq!(task.status, TaskStatus::Pending);
//! ```

mod calendar;
mod clock;
mod config;
mod error;
mod repository;
mod task;

pub use calendar::{FixedHolidays, HolidayOracle, WorkCalendar, MAX_CALENDAR_SCAN_DAYS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SchedulerConfig;
pub use error::{SchedulerError, StoreError};
pub use repository::{TaskFilter, TaskRepository};
pub use task::{Task, TaskId, TaskStatus};

/// Tolerance for comparing allocated hours.
///
/// Allocation arithmetic accumulates rounding error when hours are split
/// across days; every equality or bound check on hours goes through the
/// helpers below with this tolerance.
pub const HOURS_EPSILON: f64 = 1e-5;

/// `a == b` within [`HOURS_EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < HOURS_EPSILON
}

/// `a == 0` within [`HOURS_EPSILON`].
pub fn approx_zero(a: f64) -> bool {
    a.abs() < HOURS_EPSILON
}

/// `a >= b` within [`HOURS_EPSILON`].
pub fn approx_ge(a: f64, b: f64) -> bool {
    a > b - HOURS_EPSILON
}

/// `a <= b` within [`HOURS_EPSILON`].
pub fn approx_le(a: f64, b: f64) -> bool {
    a < b + HOURS_EPSILON
}
