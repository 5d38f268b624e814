//! Bulk recalculation, summary rollup and new-task preparation.

use crate::date_math::{calculate_duration, calculate_finish_date, midnight};
use crate::duration::{Duration, DurationUnit};
use crate::duration_sync::calculate_duration_in_days;
use crate::hierarchy::TaskTree;
use crate::linking::{current_span, place_after};
use crate::preferences::{CalendarPreferences, ProjectSettings, SchedulePreferences};
use crate::task::Task;
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::debug;

pub struct Scheduler<'a> {
    calendar: &'a CalendarPreferences,
    schedule: &'a SchedulePreferences,
}

impl<'a> Scheduler<'a> {
    pub fn new(calendar: &'a CalendarPreferences, schedule: &'a SchedulePreferences) -> Self {
        Self { calendar, schedule }
    }

    pub fn from_settings(settings: &'a ProjectSettings) -> Self {
        Self::new(&settings.calendar, &settings.schedule)
    }

    fn is_pinned(&self, task: &Task) -> bool {
        self.schedule.honor_required_dates
            && task.constraint.is_some_and(|c| c.is_required_date())
    }

    /// Re-derives every work task's finish date from its own span, then
    /// rolls summaries up. Running it on its own output changes nothing.
    pub fn recalculate_all(&self, tasks: &[Task]) -> Vec<Task> {
        let mut next = tasks.to_vec();
        let mut refreshed = 0usize;
        let mut pinned = 0usize;

        for task in next.iter_mut().filter(|task| task.is_leaf_work()) {
            if self.is_pinned(task) {
                pinned += 1;
                continue;
            }
            let (Some(start), Some(end)) = (task.start_date, task.end_date) else {
                continue;
            };
            let span = calculate_duration(start, end, DurationUnit::Hours, self.calendar);
            let end = calculate_finish_date(start, span, self.calendar);
            task.end_date = Some(end);
            task.duration = calculate_duration_in_days(Some(start), Some(end));
            refreshed += 1;
        }

        debug!(
            task_count = tasks.len(),
            refreshed, pinned, "recalculated work task dates"
        );
        recalculate_summary_tasks(&next)
    }

    pub fn prepare_new_task(&self, task: Task, last_task: Option<&Task>) -> Task {
        self.prepare_new_task_on(task, last_task, Local::now().date_naive())
    }

    /// Fills in dates for a freshly inserted task, treating `today` as the
    /// current date.
    pub fn prepare_new_task_on(
        &self,
        mut task: Task,
        last_task: Option<&Task>,
        today: NaiveDate,
    ) -> Task {
        task.start_date = task.start_date.map(midnight);
        task.end_date = task.end_date.map(midnight);

        if task.start_date.is_none() && self.schedule.new_tasks_start_today {
            task.start_date = Some(today.and_time(NaiveTime::MIN));
        }
        if let (Some(start), None) = (task.start_date, task.end_date) {
            task.end_date = Some(if task.is_milestone {
                start
            } else {
                calculate_finish_date(start, Duration::days(1.0), self.calendar)
            });
        }

        if self.schedule.auto_link_tasks && task.predecessors.is_empty() {
            if let Some(last) = last_task {
                if let Some(last_end) = last.end_date {
                    let span = current_span(&task, self.calendar);
                    place_after(&mut task, last_end, span, self.calendar);
                }
                task.predecessors.push(last.id.clone());
                debug!(task = %task.id, predecessor = %last.id, "auto-linked new task");
            }
        }

        if task.start_date.is_some() && task.end_date.is_some() {
            task.duration = calculate_duration_in_days(task.start_date, task.end_date);
        }
        task.duration = task.duration.max(1);
        task
    }
}

/// Rolls summary dates and progress up from their subtrees, deepest first.
///
/// Summary start/end become the earliest start and latest end in the
/// subtree at midnight. Progress is the mean over non-milestone tasks in the
/// subtree. Summaries without children are left alone.
pub fn recalculate_summary_tasks(tasks: &[Task]) -> Vec<Task> {
    let tree = TaskTree::build(tasks);
    let mut next = tasks.to_vec();
    let mut rolled_up = 0usize;

    for idx in tree.post_order() {
        if !next[idx].is_summary {
            continue;
        }
        let subtree = tree.descendants(idx);
        if subtree.is_empty() {
            continue;
        }

        let start = subtree.iter().filter_map(|&i| next[i].start_date).min();
        let end = subtree.iter().filter_map(|&i| next[i].end_date).max();
        let progress: Vec<f64> = subtree
            .iter()
            .map(|&i| &next[i])
            .filter(|task| !task.is_milestone)
            .map(|task| task.progress)
            .collect();

        let summary = &mut next[idx];
        if let Some(start) = start {
            summary.start_date = Some(midnight(start));
        }
        if let Some(end) = end {
            summary.end_date = Some(midnight(end));
        }
        if !progress.is_empty() {
            summary.progress = progress.iter().sum::<f64>() / progress.len() as f64;
        }
        if summary.start_date.is_some() && summary.end_date.is_some() {
            summary.duration = calculate_duration_in_days(summary.start_date, summary.end_date);
        }
        rolled_up += 1;
    }

    debug!(rolled_up, "rolled up summary tasks");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskConstraint;
    use chrono::NaiveDateTime;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn milestones_do_not_count_toward_progress() {
        let tasks = vec![
            Task::new("p", "Phase").summary(),
            Task::new("a", "A").with_level(1).with_progress(0.5),
            Task::new("b", "B").with_level(1).with_progress(0.7),
            Task::new("m", "M").with_level(1).milestone().with_progress(1.0),
        ];
        let rolled = recalculate_summary_tasks(&tasks);
        assert!((rolled[0].progress - 0.6).abs() < 1e-9);
    }

    #[test]
    fn summary_dates_span_children_at_midnight() {
        let tasks = vec![
            Task::new("p", "Phase").summary(),
            Task::new("a", "A")
                .with_level(1)
                .with_dates(at(2026, 3, 2, 9), at(2026, 3, 3, 17)),
            Task::new("b", "B")
                .with_level(1)
                .with_dates(at(2026, 3, 4, 9), at(2026, 3, 6, 17)),
        ];
        let rolled = recalculate_summary_tasks(&tasks);
        assert_eq!(rolled[0].start_date, Some(at(2026, 3, 2, 0)));
        assert_eq!(rolled[0].end_date, Some(at(2026, 3, 6, 0)));
        assert_eq!(rolled[0].duration, 4);
    }

    #[test]
    fn childless_summary_is_unchanged() {
        let tasks = vec![Task::new("p", "Phase").summary().with_progress(0.3)];
        assert_eq!(recalculate_summary_tasks(&tasks), tasks);
    }

    #[test]
    fn pinned_tasks_keep_their_dates() {
        let calendar = CalendarPreferences::default();
        let schedule = SchedulePreferences::default();
        let scheduler = Scheduler::new(&calendar, &schedule);
        let mut pinned = Task::new("a", "A").with_dates(at(2026, 3, 2, 0), at(2026, 3, 4, 0));
        pinned.constraint = Some(TaskConstraint::MustFinishOn);
        pinned.duration = 9;
        let out = scheduler.recalculate_all(&[pinned.clone()]);
        assert_eq!(out[0], pinned);
    }

    #[test]
    fn new_task_without_dates_starts_today() {
        let calendar = CalendarPreferences::default();
        let schedule = SchedulePreferences::default();
        let scheduler = Scheduler::new(&calendar, &schedule);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let task = scheduler.prepare_new_task_on(Task::new("n", "New"), None, today);
        assert_eq!(task.start_date, Some(at(2026, 10, 19, 0)));
        assert_eq!(task.end_date, Some(at(2026, 10, 19, 8)));
        assert_eq!(task.duration, 1);
    }
}
