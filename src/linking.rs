//! Finish-to-start predecessor links.
//!
//! [`link`] does not check for cycles. Call [`is_valid_predecessor`] first,
//! or use [`try_link`] which does both.

use crate::date_math::{calculate_duration, calculate_finish_date};
use crate::duration::{Duration, DurationUnit};
use crate::duration_sync::calculate_duration_in_days;
use crate::error::LinkError;
use crate::graph::TaskGraph;
use crate::preferences::CalendarPreferences;
use crate::task::Task;
use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

/// The task's current span in hours. Undated tasks fall back to their
/// stored calendar-day duration.
pub(crate) fn current_span(task: &Task, prefs: &CalendarPreferences) -> Duration {
    match (task.start_date, task.end_date) {
        (Some(start), Some(end)) => calculate_duration(start, end, DurationUnit::Hours, prefs),
        _ => Duration::hours(task.duration.max(1) as f64 * 24.0),
    }
}

/// Moves `task` to start one calendar day after `predecessor_end`,
/// keeping `span`. A predecessor ending on the last representable day keeps
/// the start on that day.
pub(crate) fn place_after(
    task: &mut Task,
    predecessor_end: NaiveDateTime,
    span: Duration,
    prefs: &CalendarPreferences,
) {
    let start = predecessor_end
        .checked_add_signed(TimeDelta::days(1))
        .unwrap_or(predecessor_end);
    let end = calculate_finish_date(start, span, prefs);
    task.start_date = Some(start);
    task.end_date = Some(end);
    task.duration = calculate_duration_in_days(Some(start), Some(end));
}

/// Makes `target_id` a predecessor of `source_id` and reschedules the source
/// to start the day after the target finishes.
///
/// Linking to a missing target, or to a target that is already a
/// predecessor, returns the tasks unchanged.
pub fn link(
    tasks: &[Task],
    source_id: &str,
    target_id: &str,
    prefs: &CalendarPreferences,
) -> Vec<Task> {
    let mut next = tasks.to_vec();
    let Some(target_end) = tasks
        .iter()
        .find(|task| task.id == target_id)
        .map(|task| task.end_date)
    else {
        return next;
    };
    let Some(source) = next.iter_mut().find(|task| task.id == source_id) else {
        return next;
    };
    if source.has_predecessor(target_id) {
        return next;
    }

    if let Some(target_end) = target_end {
        let span = current_span(source, prefs);
        place_after(source, target_end, span, prefs);
    }
    source.predecessors.push(target_id.to_string());
    next
}

/// Whether `potential_pred_id` can become a predecessor of `task_id`
/// without creating a cycle.
pub fn is_valid_predecessor(tasks: &[Task], task_id: &str, potential_pred_id: &str) -> bool {
    if task_id == potential_pred_id {
        return false;
    }
    !TaskGraph::build(tasks).depends_on(potential_pred_id, task_id)
}

/// Validates and links in one step.
pub fn try_link(
    tasks: &[Task],
    source_id: &str,
    target_id: &str,
    prefs: &CalendarPreferences,
) -> Result<Vec<Task>, LinkError> {
    for id in [source_id, target_id] {
        if !tasks.iter().any(|task| task.id == id) {
            return Err(LinkError::UnknownTask(id.to_string()));
        }
    }
    if source_id == target_id {
        return Err(LinkError::SelfLink(source_id.to_string()));
    }
    if !is_valid_predecessor(tasks, source_id, target_id) {
        debug!(task = source_id, predecessor = target_id, "refusing cyclic link");
        return Err(LinkError::Cycle {
            task: source_id.to_string(),
            predecessor: target_id.to_string(),
        });
    }
    Ok(link(tasks, source_id, target_id, prefs))
}

/// Removes `target_id` from the predecessors of `source_id`. Dates are kept.
pub fn unlink(tasks: &[Task], source_id: &str, target_id: &str) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if task.id == source_id {
                task.predecessors.retain(|pred| pred != target_id);
            }
            task
        })
        .collect()
}
