use crate::preferences::SchedulingType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = String;

/// Hard date constraint on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskConstraint {
    AsSoonAsPossible,
    AsLateAsPossible,
    MustStartOn,
    MustFinishOn,
    StartNoEarlierThan,
    StartNoLaterThan,
    FinishNoEarlierThan,
    FinishNoLaterThan,
}

impl TaskConstraint {
    pub const ALL: [TaskConstraint; 8] = [
        TaskConstraint::AsSoonAsPossible,
        TaskConstraint::AsLateAsPossible,
        TaskConstraint::MustStartOn,
        TaskConstraint::MustFinishOn,
        TaskConstraint::StartNoEarlierThan,
        TaskConstraint::StartNoLaterThan,
        TaskConstraint::FinishNoEarlierThan,
        TaskConstraint::FinishNoLaterThan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskConstraint::AsSoonAsPossible => "as_soon_as_possible",
            TaskConstraint::AsLateAsPossible => "as_late_as_possible",
            TaskConstraint::MustStartOn => "must_start_on",
            TaskConstraint::MustFinishOn => "must_finish_on",
            TaskConstraint::StartNoEarlierThan => "start_no_earlier_than",
            TaskConstraint::StartNoLaterThan => "start_no_later_than",
            TaskConstraint::FinishNoEarlierThan => "finish_no_earlier_than",
            TaskConstraint::FinishNoLaterThan => "finish_no_later_than",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Dates pinned by this constraint may not be moved by bulk recalculation.
    pub fn is_required_date(&self) -> bool {
        matches!(self, TaskConstraint::MustStartOn | TaskConstraint::MustFinishOn)
    }
}

/// Share of a resource assigned to a task. `1.0` is one full-time resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAssignment {
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<f64>,
}

impl ResourceAssignment {
    pub const DEFAULT_UNITS: f64 = 1.0;

    pub fn new(resource_id: impl Into<String>, units: f64) -> Self {
        Self {
            resource_id: resource_id.into(),
            units: Some(units),
        }
    }

    /// An assignment without explicit units counts as one full resource.
    pub fn full(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            units: None,
        }
    }

    pub fn effective_units(&self) -> f64 {
        self.units.unwrap_or(Self::DEFAULT_UNITS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
    /// Calendar-elapsed days, at least 1.
    #[serde(default = "default_duration")]
    pub duration: i64,
    /// Fraction complete, `0.0..=1.0`.
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default)]
    pub is_summary: bool,
    /// Hierarchy depth, 0 for top-level tasks.
    #[serde(default)]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub predecessors: Vec<TaskId>,
    #[serde(default)]
    pub resource_assignments: Vec<ResourceAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<TaskConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_type: Option<SchedulingType>,
}

fn default_duration() -> i64 {
    1
}

impl Task {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date: None,
            end_date: None,
            duration: 1,
            progress: 0.0,
            is_milestone: false,
            is_summary: false,
            level: 0,
            parent_id: None,
            predecessors: Vec::new(),
            resource_assignments: Vec::new(),
            constraint: None,
            scheduling_type: None,
        }
    }

    pub fn with_dates(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn summary(mut self) -> Self {
        self.is_summary = true;
        self
    }

    pub fn milestone(mut self) -> Self {
        self.is_milestone = true;
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn is_leaf_work(&self) -> bool {
        !self.is_milestone && !self.is_summary
    }

    pub fn has_predecessor(&self, id: &str) -> bool {
        self.predecessors.iter().any(|p| p == id)
    }
}

/// A partial edit to a task. `None` leaves the field untouched.
///
/// Dates are doubly optional: `Some(None)` (JSON `null`) clears the date,
/// while an absent field leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_date_patch"
    )]
    pub start_date: Option<Option<NaiveDateTime>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_date_patch"
    )]
    pub end_date: Option<Option<NaiveDateTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predecessors: Option<Vec<TaskId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_assignments: Option<Vec<ResourceAssignment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<TaskConstraint>,
}

fn deserialize_date_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<NaiveDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDateTime>::deserialize(deserializer).map(Some)
}

impl TaskUpdate {
    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Returns `task` with every field present in `update` applied.
pub fn apply_update(task: &Task, update: &TaskUpdate) -> Task {
    let mut next = task.clone();
    if let Some(name) = &update.name {
        next.name = name.clone();
    }
    if let Some(start) = update.start_date {
        next.start_date = start;
    }
    if let Some(end) = update.end_date {
        next.end_date = end;
    }
    if let Some(duration) = update.duration {
        next.duration = duration;
    }
    if let Some(progress) = update.progress {
        next.progress = progress;
    }
    if let Some(predecessors) = &update.predecessors {
        next.predecessors = predecessors.clone();
    }
    if let Some(assignments) = &update.resource_assignments {
        next.resource_assignments = assignments.clone();
    }
    if let Some(constraint) = update.constraint {
        next.constraint = Some(constraint);
    }
    next
}

/// Ids of tasks that list `id` as a predecessor, in list order.
pub fn successors_of(tasks: &[Task], id: &str) -> Vec<TaskId> {
    tasks
        .iter()
        .filter(|task| task.has_predecessor(id))
        .map(|task| task.id.clone())
        .collect()
}
