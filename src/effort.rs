//! Effort-driven scheduling: total work stays constant as units change.

use crate::date_math::{calculate_duration, calculate_finish_date};
use crate::duration::{Duration, DurationUnit};
use crate::duration_sync::calculate_duration_in_days;
use crate::preferences::{CalendarPreferences, SchedulingType};
use crate::task::{ResourceAssignment, Task};
use tracing::debug;

const EPSILON: f64 = 1e-9;

fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Sum of assignment units; assignments without units count as 1.
pub fn total_units(task: &Task) -> f64 {
    task.resource_assignments
        .iter()
        .map(ResourceAssignment::effective_units)
        .sum()
}

pub fn should_apply(effort_driven_enabled: bool, task: &Task) -> bool {
    effort_driven_enabled
        && !task.is_milestone
        && !task.is_summary
        && task.scheduling_type != Some(SchedulingType::FixedDuration)
}

/// Rescales the task's span by `original_total_units / new_total_units`.
///
/// The first assignment on a task (`original_total_units == 0`) keeps the
/// authored span, as does a change that leaves the total untouched.
pub fn recalculate_duration(
    task: &Task,
    original_total_units: f64,
    prefs: &CalendarPreferences,
) -> Task {
    let new_total_units = total_units(task);
    if approx_equal(new_total_units, 0.0)
        || approx_equal(original_total_units, 0.0)
        || approx_equal(new_total_units, original_total_units)
    {
        return task.clone();
    }
    let (Some(start), Some(end)) = (task.start_date, task.end_date) else {
        debug!(task = %task.id, "skipping effort recalculation for undated task");
        return task.clone();
    };

    let ratio = original_total_units / new_total_units;
    let hours = calculate_duration(start, end, DurationUnit::Hours, prefs).value;
    let new_end = calculate_finish_date(start, Duration::hours(hours * ratio), prefs);
    debug!(
        task = %task.id,
        original_total_units,
        new_total_units,
        ratio,
        "rescaled task span"
    );

    let mut next = task.clone();
    next.end_date = Some(new_end);
    next.duration = calculate_duration_in_days(Some(start), Some(new_end));
    next
}

/// Replaces the task's assignments and, when effort-driven scheduling
/// applies, rescales its span to keep total work constant.
pub fn reassign(
    task: &Task,
    assignments: Vec<ResourceAssignment>,
    effort_driven_enabled: bool,
    prefs: &CalendarPreferences,
) -> Task {
    let original_total_units = total_units(task);
    let mut next = task.clone();
    next.resource_assignments = assignments;
    if should_apply(effort_driven_enabled, &next) {
        recalculate_duration(&next, original_total_units, prefs)
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn three_day_task() -> Task {
        let mut task = Task::new("1", "Build").with_dates(day(2026, 1, 5), day(2026, 1, 8));
        task.duration = 3;
        task
    }

    #[test]
    fn total_units_defaults_missing_units_to_one() {
        let mut task = three_day_task();
        task.resource_assignments = vec![
            ResourceAssignment::full("a"),
            ResourceAssignment::new("b", 0.5),
        ];
        assert_eq!(total_units(&task), 1.5);
    }

    #[test]
    fn adding_a_second_resource_halves_the_span() {
        let mut task = three_day_task();
        task.resource_assignments = vec![
            ResourceAssignment::new("a", 1.0),
            ResourceAssignment::new("b", 1.0),
        ];
        let next = recalculate_duration(&task, 1.0, &CalendarPreferences::default());
        assert_eq!(
            next.end_date,
            Some(day(2026, 1, 6) + chrono::TimeDelta::hours(12))
        );
        assert!(next.duration < 3);
        assert_eq!(next.start_date, task.start_date);
    }

    #[test]
    fn removing_a_resource_stretches_the_span() {
        let mut task = three_day_task();
        task.resource_assignments = vec![ResourceAssignment::new("a", 1.0)];
        let next = recalculate_duration(&task, 2.0, &CalendarPreferences::default());
        assert_eq!(next.end_date, Some(day(2026, 1, 11)));
        assert_eq!(next.duration, 6);
    }

    #[test]
    fn first_assignment_keeps_authored_span() {
        let mut task = three_day_task();
        task.resource_assignments = vec![ResourceAssignment::new("a", 3.0)];
        let next = recalculate_duration(&task, 0.0, &CalendarPreferences::default());
        assert_eq!(next, task);
    }

    #[test]
    fn unchanged_or_empty_totals_are_no_ops() {
        let mut task = three_day_task();
        task.resource_assignments = vec![ResourceAssignment::new("a", 1.0)];
        assert_eq!(
            recalculate_duration(&task, 1.0, &CalendarPreferences::default()),
            task
        );
        task.resource_assignments.clear();
        assert_eq!(
            recalculate_duration(&task, 1.0, &CalendarPreferences::default()),
            task
        );
    }

    #[test]
    fn should_apply_excludes_milestones_summaries_and_fixed_duration() {
        let task = three_day_task();
        assert!(should_apply(true, &task));
        assert!(!should_apply(false, &task));
        assert!(!should_apply(true, &task.clone().milestone()));
        assert!(!should_apply(true, &task.clone().summary()));
        let mut fixed = task.clone();
        fixed.scheduling_type = Some(SchedulingType::FixedDuration);
        assert!(!should_apply(true, &fixed));
    }

    #[test]
    fn reassign_respects_preference() {
        let mut task = three_day_task();
        task.resource_assignments = vec![ResourceAssignment::full("a")];
        let doubled = vec![ResourceAssignment::full("a"), ResourceAssignment::full("b")];
        let prefs = CalendarPreferences::default();

        let off = reassign(&task, doubled.clone(), false, &prefs);
        assert_eq!(off.end_date, task.end_date);
        assert_eq!(off.resource_assignments.len(), 2);

        let on = reassign(&task, doubled, true, &prefs);
        assert!(on.end_date < task.end_date);
    }
}
