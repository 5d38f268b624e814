use crate::error::ValidationError;
use crate::task::Task;
use std::collections::HashSet;

const EPSILON: f64 = 1e-6;

pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.duration < 1 {
        return Err(ValidationError::InvalidDuration {
            id: task.id.clone(),
            duration: task.duration,
        });
    }

    if !task.progress.is_finite() || task.progress < -EPSILON || task.progress > 1.0 + EPSILON {
        return Err(ValidationError::InvalidProgress {
            id: task.id.clone(),
            progress: task.progress,
        });
    }

    if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
        if end < start {
            return Err(ValidationError::EndBeforeStart(task.id.clone()));
        }
    }

    for (index, assignment) in task.resource_assignments.iter().enumerate() {
        if assignment.resource_id.trim().is_empty() {
            return Err(ValidationError::EmptyResourceId {
                id: task.id.clone(),
                index,
            });
        }
        let units = assignment.effective_units();
        if !units.is_finite() || units < -EPSILON {
            return Err(ValidationError::InvalidUnits {
                id: task.id.clone(),
                resource_id: assignment.resource_id.clone(),
                units,
            });
        }
    }

    Ok(())
}

/// Checks ids are unique, every task is well formed and every predecessor
/// exists. Stops at the first problem.
pub fn validate_tasks(tasks: &[Task]) -> Result<(), ValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            return Err(ValidationError::DuplicateId(task.id.clone()));
        }
        validate_task(task)?;
    }
    for task in tasks {
        if let Some(missing) = task
            .predecessors
            .iter()
            .find(|pred| !seen_ids.contains(pred.as_str()))
        {
            return Err(ValidationError::UnknownPredecessor {
                id: task.id.clone(),
                predecessor: missing.clone(),
            });
        }
    }
    Ok(())
}
