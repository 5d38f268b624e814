pub mod calendar;
pub mod date_math;
pub mod duration;
pub mod duration_sync;
pub mod effort;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod linking;
pub mod preferences;
pub mod scheduler;
pub mod table;
pub mod task;
pub mod validation;

pub use calendar::{CalendarException, WorkCalendar, WorkCalendarConfig};
pub use date_math::{
    calculate_duration, calculate_duration_with_calendar, calculate_finish_date,
    calculate_finish_date_with_calendar, midnight,
};
pub use duration::{Duration, DurationUnit, convert_duration};
pub use duration_sync::{
    calculate_duration_in_days, enrich_updates_with_duration, try_calculate_duration_in_days,
};
pub use error::{
    CalendarError, ConfigError, DateRangeError, DurationParseError, LinkError, TableError,
    ValidationError,
};
pub use graph::TaskGraph;
pub use hierarchy::TaskTree;
pub use linking::{is_valid_predecessor, link, try_link, unlink};
pub use preferences::{
    CalendarPreferences, DurationCalculationMode, ProjectSettings, SchedulePreferences,
    SchedulingType,
};
pub use scheduler::{Scheduler, recalculate_summary_tasks};
pub use table::{tasks_from_dataframe, tasks_to_dataframe};
pub use task::{
    ResourceAssignment, Task, TaskConstraint, TaskId, TaskUpdate, apply_update, successors_of,
};
pub use validation::{validate_task, validate_tasks};
