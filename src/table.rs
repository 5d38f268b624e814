//! Tabular view of a task list.
//!
//! Callers that render grids or diff task state column by column can move
//! between `&[Task]` and a polars `DataFrame` with a fixed schema. Dates are
//! stored as millisecond datetimes without a time zone, resource
//! assignments as a JSON string.

use crate::error::TableError;
use crate::preferences::SchedulingType;
use crate::task::{ResourceAssignment, Task, TaskConstraint};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::PlSmallStr;
use polars::prelude::*;

pub const COLUMNS: [&str; 14] = [
    "id",
    "name",
    "start_date",
    "end_date",
    "duration",
    "progress",
    "is_milestone",
    "is_summary",
    "level",
    "parent_id",
    "predecessors",
    "resource_assignments",
    "constraint",
    "scheduling_type",
];

pub fn tasks_to_dataframe(tasks: &[Task]) -> Result<DataFrame, TableError> {
    let mut columns: Vec<Column> = Vec::with_capacity(COLUMNS.len());

    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("id"), ids).into_column());

    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("name"), names).into_column());

    columns.push(datetime_series("start_date", tasks.iter().map(|t| t.start_date))?.into_column());
    columns.push(datetime_series("end_date", tasks.iter().map(|t| t.end_date))?.into_column());

    let durations: Vec<i64> = tasks.iter().map(|t| t.duration).collect();
    columns.push(Series::new(PlSmallStr::from_static("duration"), durations).into_column());

    let progress: Vec<f64> = tasks.iter().map(|t| t.progress).collect();
    columns.push(Series::new(PlSmallStr::from_static("progress"), progress).into_column());

    let milestones: Vec<bool> = tasks.iter().map(|t| t.is_milestone).collect();
    columns.push(Series::new(PlSmallStr::from_static("is_milestone"), milestones).into_column());

    let summaries: Vec<bool> = tasks.iter().map(|t| t.is_summary).collect();
    columns.push(Series::new(PlSmallStr::from_static("is_summary"), summaries).into_column());

    let levels: Vec<u32> = tasks.iter().map(|t| t.level).collect();
    columns.push(Series::new(PlSmallStr::from_static("level"), levels).into_column());

    let parents: Vec<Option<&str>> = tasks.iter().map(|t| t.parent_id.as_deref()).collect();
    columns.push(Series::new(PlSmallStr::from_static("parent_id"), parents).into_column());

    let predecessor_rows: Vec<Series> = tasks
        .iter()
        .map(|t| {
            let values: Vec<&str> = t.predecessors.iter().map(String::as_str).collect();
            Series::new(PlSmallStr::from_static(""), values)
        })
        .collect();
    columns.push(
        Series::new(PlSmallStr::from_static("predecessors"), predecessor_rows).into_column(),
    );

    let assignments = tasks
        .iter()
        .map(|t| serde_json::to_string(&t.resource_assignments))
        .collect::<Result<Vec<String>, _>>()
        .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?;
    columns.push(
        Series::new(PlSmallStr::from_static("resource_assignments"), assignments).into_column(),
    );

    let constraints: Vec<Option<&str>> = tasks
        .iter()
        .map(|t| t.constraint.as_ref().map(TaskConstraint::as_str))
        .collect();
    columns.push(Series::new(PlSmallStr::from_static("constraint"), constraints).into_column());

    let scheduling: Vec<Option<&str>> = tasks
        .iter()
        .map(|t| t.scheduling_type.as_ref().map(SchedulingType::as_str))
        .collect();
    columns.push(
        Series::new(PlSmallStr::from_static("scheduling_type"), scheduling).into_column(),
    );

    Ok(DataFrame::new(columns)?)
}

pub fn tasks_from_dataframe(df: &DataFrame) -> Result<Vec<Task>, TableError> {
    let ids = df.column("id")?.str()?;
    let names = df.column("name")?.str()?;
    let starts = df.column("start_date")?.datetime()?;
    let ends = df.column("end_date")?.datetime()?;
    let durations = df.column("duration")?.i64()?;
    let progress = df.column("progress")?.f64()?;
    let milestones = df.column("is_milestone")?.bool()?;
    let summaries = df.column("is_summary")?.bool()?;
    let levels = df.column("level")?.u32()?;
    let parents = df.column("parent_id")?.str()?;
    let predecessors = df.column("predecessors")?.list()?;
    let assignments = df.column("resource_assignments")?.str()?;
    let constraints = df.column("constraint")?.str()?;
    let scheduling = df.column("scheduling_type")?.str()?;

    let mut tasks = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let id = ids.get(row).ok_or(TableError::MissingValue { row, column: "id" })?;
        let mut task = Task::new(id, names.get(row).unwrap_or(""));
        task.start_date = starts.get(row).and_then(datetime_from_millis);
        task.end_date = ends.get(row).and_then(datetime_from_millis);
        task.duration = durations.get(row).unwrap_or(1);
        task.progress = progress.get(row).unwrap_or(0.0);
        task.is_milestone = milestones.get(row).unwrap_or(false);
        task.is_summary = summaries.get(row).unwrap_or(false);
        task.level = levels.get(row).unwrap_or(0);
        task.parent_id = parents.get(row).map(ToOwned::to_owned);
        task.predecessors = string_list(predecessors, row)?;
        task.resource_assignments = match assignments.get(row) {
            Some(json) => serde_json::from_str::<Vec<ResourceAssignment>>(json)
                .map_err(|source| TableError::Assignments { row, source })?,
            None => Vec::new(),
        };
        task.constraint = constraints
            .get(row)
            .map(|value| {
                TaskConstraint::from_str_opt(value).ok_or_else(|| TableError::UnknownVariant {
                    row,
                    column: "constraint",
                    value: value.to_string(),
                })
            })
            .transpose()?;
        task.scheduling_type = scheduling
            .get(row)
            .map(|value| {
                SchedulingType::from_str_opt(value).ok_or_else(|| TableError::UnknownVariant {
                    row,
                    column: "scheduling_type",
                    value: value.to_string(),
                })
            })
            .transpose()?;
        tasks.push(task);
    }
    Ok(tasks)
}

fn datetime_series(
    name: &'static str,
    values: impl Iterator<Item = Option<NaiveDateTime>>,
) -> PolarsResult<Series> {
    let millis: Vec<Option<i64>> = values
        .map(|value| value.map(|dt| dt.and_utc().timestamp_millis()))
        .collect();
    Series::new(PlSmallStr::from_static(name), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

fn datetime_from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

fn string_list(list: &ListChunked, row: usize) -> PolarsResult<Vec<String>> {
    if let Some(series) = list.get_as_series(row) {
        Ok(series
            .str()?
            .into_iter()
            .flatten()
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>())
    } else {
        Ok(Vec::new())
    }
}
