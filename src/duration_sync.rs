//! Keeps the stored `duration` (calendar days) consistent with task dates.
//!
//! Stored duration is always calendar-elapsed days, whatever the
//! [`crate::DurationCalculationMode`]. Working time only matters at the
//! resource assignment level.

use crate::duration::MS_PER_CALENDAR_DAY;
use crate::error::DateRangeError;
use crate::task::{Task, TaskUpdate};
use chrono::NaiveDateTime;
use tracing::warn;

/// Calendar days between two dates, or the reason they are unusable.
///
/// Inverted or empty ranges are not errors: they clamp to one day.
pub fn try_calculate_duration_in_days(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<i64, DateRangeError> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (None, Some(_)) => return Err(DateRangeError::MissingStart),
        (Some(_), None) => return Err(DateRangeError::MissingEnd),
        (None, None) => return Err(DateRangeError::MissingBoth),
    };
    if end <= start {
        return Ok(1);
    }
    let days = ((end - start).num_milliseconds() as f64 / MS_PER_CALENDAR_DAY).round() as i64;
    Ok(days.max(1))
}

/// Calendar days between two dates, never less than 1.
/// Missing dates log a warning and count as one day.
pub fn calculate_duration_in_days(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> i64 {
    try_calculate_duration_in_days(start, end).unwrap_or_else(|err| {
        warn!(
            ?start,
            ?end,
            error = %err,
            "invalid date range, defaulting duration to 1 day"
        );
        1
    })
}

/// Attaches a recomputed `duration` to an update that moves either date.
///
/// The endpoint missing from the update falls back to `current`. Updates
/// that do not touch dates are returned unchanged.
pub fn enrich_updates_with_duration(update: TaskUpdate, current: &Task) -> TaskUpdate {
    if !update.touches_dates() {
        return update;
    }
    let start = update.start_date.unwrap_or(current.start_date);
    let end = update.end_date.unwrap_or(current.end_date);
    TaskUpdate {
        duration: Some(calculate_duration_in_days(start, end)),
        ..update
    }
}
