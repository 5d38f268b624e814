//! Error types surfaced by the scheduling core.
//!
//! Most operations recover locally (a bad date range becomes one day, a
//! cyclic link is refused with `false`). These types back the `try_*`
//! variants for callers that want the reason instead of the default.

use crate::task::TaskId;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Text that could not be read as a [`crate::Duration`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("duration is missing a numeric value")]
    MissingValue,

    #[error("duration is missing a unit")]
    MissingUnit,

    #[error("invalid duration value '{0}'")]
    InvalidValue(String),

    #[error("unknown duration unit '{0}'")]
    UnknownUnit(String),
}

/// Invalid project settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive finite number (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("hours_per_day cannot exceed 24 (got {0})")]
    DayTooLong(f64),
}

/// Invalid working calendar definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("work calendar requires at least one working day")]
    NoWorkingDays,

    #[error("working days per week must be between 1 and 7 (got {0})")]
    WorkingDaysOutOfRange(u32),

    #[error("hours per day must be greater than 0 and at most 24 (got {0})")]
    InvalidHoursPerDay(f64),

    #[error("exception hours must be between 0 and 24 (got {0})")]
    InvalidExceptionHours(f64),
}

/// Why two dates could not produce a duration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("start date is missing")]
    MissingStart,

    #[error("end date is missing")]
    MissingEnd,

    #[error("start and end dates are missing")]
    MissingBoth,
}

/// A predecessor link that was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("task {0} cannot be its own predecessor")]
    SelfLink(TaskId),

    #[error("linking {predecessor} before {task} would create a cycle")]
    Cycle { task: TaskId, predecessor: TaskId },

    #[error("unknown task {0}")]
    UnknownTask(TaskId),
}

/// A structural problem in a task collection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("duplicate task id {0}")]
    DuplicateId(TaskId),

    #[error("task {id} has invalid progress {progress} (must be between 0 and 1)")]
    InvalidProgress { id: TaskId, progress: f64 },

    #[error("task {id} has invalid duration {duration} (must be at least 1 day)")]
    InvalidDuration { id: TaskId, duration: i64 },

    #[error("task {id} assignment #{index} requires a non-empty resource_id")]
    EmptyResourceId { id: TaskId, index: usize },

    #[error("task {id} assignment for '{resource_id}' has invalid units {units}")]
    InvalidUnits {
        id: TaskId,
        resource_id: String,
        units: f64,
    },

    #[error("task {id} references unknown predecessor {predecessor}")]
    UnknownPredecessor { id: TaskId, predecessor: TaskId },

    #[error("task {0} ends before it starts")]
    EndBeforeStart(TaskId),
}

/// Failure converting tasks to or from a dataframe.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("dataframe error: {0}")]
    DataFrame(#[from] PolarsError),

    #[error("row {row} is missing required column value '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row} has unknown {column} '{value}'")]
    UnknownVariant {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row} has unreadable resource assignments: {source}")]
    Assignments {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
}
