use indexmap::IndexMap;
use serde::Serialize;

use crate::model::board::Column;
use crate::model::task::Task;

/// Task ids bucketed by column, each bucket sorted by `order`.
///
/// Buckets are always present and iterate in board order
/// (todo, in-progress, done).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProjection {
    columns: IndexMap<Column, Vec<String>>,
}

impl ColumnProjection {
    pub fn empty() -> Self {
        ColumnProjection {
            columns: Column::ALL.into_iter().map(|c| (c, Vec::new())).collect(),
        }
    }

    pub fn ids(&self, column: Column) -> &[String] {
        self.columns.get(&column).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn ids_mut(&mut self, column: Column) -> &mut Vec<String> {
        self.columns.entry(column).or_default()
    }

    pub fn set_ids(&mut self, column: Column, ids: Vec<String>) {
        self.columns.insert(column, ids);
    }

    /// Iterate `(column, ids)` in board order
    pub fn iter(&self) -> impl Iterator<Item = (Column, &[String])> {
        self.columns.iter().map(|(c, ids)| (*c, ids.as_slice()))
    }

    pub fn column_of(&self, task_id: &str) -> Option<Column> {
        self.position_of(task_id).map(|(c, _)| c)
    }

    pub fn position_of(&self, task_id: &str) -> Option<(Column, usize)> {
        self.columns.iter().find_map(|(c, ids)| {
            ids.iter().position(|id| id == task_id).map(|idx| (*c, idx))
        })
    }

    /// Total number of task ids across all columns
    pub fn len(&self) -> usize {
        self.columns.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive the three column buckets from a project's flat task list.
///
/// Tasks are filtered by status and sorted ascending by `order`; equal orders
/// fall back to creation time, then id.
pub fn project_columns(tasks: &[Task]) -> ColumnProjection {
    let mut projection = ColumnProjection::empty();
    for column in Column::ALL {
        let status = column.status();
        let mut in_column: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
        in_column.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        projection.set_ids(column, in_column.iter().map(|t| t.id.clone()).collect());
    }
    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::member::MemberRef;
    use crate::model::task::{Priority, TaskStatus};
    use chrono::{TimeZone, Utc};

    fn task(id: &str, status: TaskStatus, order: u32) -> Task {
        let at = Utc.with_ymd_and_hms(2023, 6, 1, 10, 0, 0).unwrap();
        Task {
            id: id.into(),
            title: id.to_uppercase(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            assigned_to: None,
            created_by: MemberRef::new("user1", "John Doe"),
            due_date: None,
            order,
            created_at: at,
            updated_at: at,
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_buckets_by_status_and_sorts_by_order() {
        let tasks = vec![
            task("a", TaskStatus::Todo, 2),
            task("b", TaskStatus::Completed, 0),
            task("c", TaskStatus::Todo, 0),
            task("d", TaskStatus::InProgress, 0),
            task("e", TaskStatus::Todo, 1),
        ];
        let p = project_columns(&tasks);
        assert_eq!(p.ids(Column::Todo), ["c", "e", "a"]);
        assert_eq!(p.ids(Column::InProgress), ["d"]);
        assert_eq!(p.ids(Column::Done), ["b"]);
        assert_eq!(p.len(), 5);
    }

    #[test]
    fn test_empty_columns_present_in_board_order() {
        let p = project_columns(&[]);
        let order: Vec<Column> = p.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Column::ALL);
        assert!(p.is_empty());
    }

    #[test]
    fn test_equal_orders_break_ties_by_id() {
        let tasks = vec![task("z", TaskStatus::Todo, 0), task("m", TaskStatus::Todo, 0)];
        let p = project_columns(&tasks);
        assert_eq!(p.ids(Column::Todo), ["m", "z"]);
    }

    #[test]
    fn test_position_of() {
        let tasks = vec![task("a", TaskStatus::Todo, 0), task("b", TaskStatus::Todo, 1)];
        let p = project_columns(&tasks);
        assert_eq!(p.position_of("b"), Some((Column::Todo, 1)));
        assert_eq!(p.column_of("missing"), None);
    }
}
