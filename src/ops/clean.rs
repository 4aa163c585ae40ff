use crate::model::board::Column;
use crate::model::project::Project;
use crate::ops::projection::project_columns;

/// Renumber every column of a project to a gap-free `0..n`, keeping the
/// current display order. Returns the number of tasks whose order changed.
pub fn compact_orders(project: &mut Project) -> usize {
    Column::ALL
        .into_iter()
        .map(|column| compact_column(project, column))
        .sum()
}

/// Renumber one column. Returns the number of tasks whose order changed.
pub fn compact_column(project: &mut Project, column: Column) -> usize {
    let projection = project_columns(&project.tasks);
    let mut changed = 0;
    for (index, task_id) in projection.ids(column).iter().enumerate() {
        if let Some(task) = project.task_mut(task_id)
            && task.order != index as u32
        {
            task.order = index as u32;
            changed += 1;
        }
    }
    changed
}
