use std::collections::HashMap;

use serde::Serialize;

use crate::model::board::Column;
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::Task;

/// Structured result from `tb check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// Something that should be fixed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same task id appears more than once
    #[serde(rename = "duplicate_id")]
    DuplicateId {
        task_id: String,
        project_ids: Vec<String>,
    },
    /// A task is assigned to someone who is not a project member
    #[serde(rename = "assignee_not_member")]
    AssigneeNotMember {
        project_id: String,
        task_id: String,
        member_id: String,
    },
    #[serde(rename = "comment_without_author")]
    CommentWithoutAuthor {
        project_id: String,
        task_id: String,
        comment_id: String,
    },
}

/// Non-critical issue; `tb compact` fixes both kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Orders in a column are not the sequence `0..n`
    #[serde(rename = "order_gap")]
    OrderGap {
        project_id: String,
        column: Column,
        orders: Vec<u32>,
    },
    /// Two or more tasks in a column share an order value
    #[serde(rename = "duplicate_order")]
    DuplicateOrder {
        project_id: String,
        column: Column,
        order: u32,
        task_ids: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate every project in a snapshot. Read-only.
///
/// Checks performed:
/// 1. No duplicate task ids anywhere in the snapshot
/// 2. Every assignee is a member of the task's project
/// 3. Every comment names its author
/// 4. Warnings for order gaps and repeated orders within a column
pub fn check_snapshot(snapshot: &Snapshot) -> CheckResult {
    let mut result = CheckResult::default();

    result.errors.extend(find_duplicate_ids(snapshot));
    for project in &snapshot.projects {
        check_project(project, &mut result);
    }

    result.valid = result.errors.is_empty();
    result
}

fn check_project(project: &Project, result: &mut CheckResult) {
    for task in &project.tasks {
        check_task(project, task, result);
    }
    for column in Column::ALL {
        check_column_orders(project, column, result);
    }
}

fn check_task(project: &Project, task: &Task, result: &mut CheckResult) {
    if let Some(assignee) = &task.assigned_to
        && !project.is_member(&assignee.id)
    {
        result.errors.push(CheckError::AssigneeNotMember {
            project_id: project.id.clone(),
            task_id: task.id.clone(),
            member_id: assignee.id.clone(),
        });
    }

    for comment in &task.comments {
        if comment.commented_by.id.trim().is_empty() {
            result.errors.push(CheckError::CommentWithoutAuthor {
                project_id: project.id.clone(),
                task_id: task.id.clone(),
                comment_id: comment.id.clone(),
            });
        }
    }
}

fn check_column_orders(project: &Project, column: Column, result: &mut CheckResult) {
    let status = column.status();
    let mut by_order: HashMap<u32, Vec<String>> = HashMap::new();
    for task in project.tasks.iter().filter(|t| t.status == status) {
        by_order.entry(task.order).or_default().push(task.id.clone());
    }

    let mut repeated: Vec<(u32, Vec<String>)> = by_order
        .iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(order, ids)| (*order, ids.clone()))
        .collect();
    repeated.sort_by_key(|(order, _)| *order);
    for (order, task_ids) in repeated {
        result.warnings.push(CheckWarning::DuplicateOrder {
            project_id: project.id.clone(),
            column,
            order,
            task_ids,
        });
    }

    let mut orders: Vec<u32> = by_order.keys().copied().collect();
    orders.sort_unstable();
    let dense = orders.iter().enumerate().all(|(i, o)| *o == i as u32);
    if !dense {
        result.warnings.push(CheckWarning::OrderGap {
            project_id: project.id.clone(),
            column,
            orders,
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Task ids that appear more than once (within or across projects)
fn find_duplicate_ids(snapshot: &Snapshot) -> Vec<CheckError> {
    // id -> project ids where it appears, repeats included
    let mut locations: HashMap<&str, Vec<String>> = HashMap::new();
    for project in &snapshot.projects {
        for task in &project.tasks {
            locations
                .entry(task.id.as_str())
                .or_default()
                .push(project.id.clone());
        }
    }

    let mut dups: Vec<(&str, Vec<String>)> = locations
        .into_iter()
        .filter(|(_, projects)| projects.len() > 1)
        .collect();
    dups.sort_by_key(|(task_id, _)| *task_id);
    dups.into_iter()
        .map(|(task_id, project_ids)| CheckError::DuplicateId {
            task_id: task_id.to_string(),
            project_ids,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
