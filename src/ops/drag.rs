use log::{debug, warn};
use serde::Serialize;

use crate::model::board::Column;
use crate::model::task::TaskStatus;
use crate::ops::projection::{ColumnProjection, project_columns};
use crate::ops::store::{StoreError, TaskStore};

/// Error type for drag operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("a drag is already in progress for {0}")]
    AlreadyDragging(String),
    #[error("no drag in progress")]
    NotDragging,
    #[error("task {task_id} is not at {column}[{index}]")]
    StaleSource {
        task_id: String,
        column: Column,
        index: usize,
    },
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("task not on board: {0}")]
    TaskNotFound(String),
    #[error("drop was rolled back: {0}")]
    RolledBack(#[from] StoreError),
}

/// A slot on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropLocation {
    pub column: Column,
    pub index: usize,
}

impl DropLocation {
    pub fn new(column: Column, index: usize) -> Self {
        DropLocation { column, index }
    }
}

/// What the drag layer reports when a drag ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResult {
    pub task_id: String,
    pub source: DropLocation,
    /// `None` when dropped outside any column
    pub destination: Option<DropLocation>,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: String,
        source: DropLocation,
    },
}

/// Tracks one drag gesture: `Idle -> Dragging -> (finish | cancel) -> Idle`
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn start(&mut self, task_id: &str, source: DropLocation) -> Result<(), DragError> {
        if let DragState::Dragging { task_id: current, .. } = &self.state {
            return Err(DragError::AlreadyDragging(current.clone()));
        }
        self.state = DragState::Dragging {
            task_id: task_id.to_string(),
            source,
        };
        Ok(())
    }

    /// End the drag, producing the result to reconcile
    pub fn finish(&mut self, destination: Option<DropLocation>) -> Result<DragResult, DragError> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { task_id, source } => Ok(DragResult {
                task_id,
                source,
                destination,
            }),
            DragState::Idle => Err(DragError::NotDragging),
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// The reconciled outcome of a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DropPlan {
    /// Dropped back onto its own slot
    Unchanged,
    /// Dropped outside any column
    Invalid,
    SameColumn {
        task_id: String,
        column: Column,
        ids: Vec<String>,
    },
    CrossColumn {
        task_id: String,
        source: Column,
        source_ids: Vec<String>,
        destination: Column,
        destination_ids: Vec<String>,
    },
}

impl DropPlan {
    pub fn changes_board(&self) -> bool {
        matches!(self, DropPlan::SameColumn { .. } | DropPlan::CrossColumn { .. })
    }
}

/// Work out the new column lists for a drop without touching anything.
///
/// The dragged id must sit at the source index. A destination index past the
/// end of the column lands at the end.
pub fn plan_drop(columns: &ColumnProjection, result: &DragResult) -> Result<DropPlan, DragError> {
    let Some(destination) = result.destination else {
        return Ok(DropPlan::Invalid);
    };
    let source = result.source;
    if source == destination {
        return Ok(DropPlan::Unchanged);
    }

    let source_ids = columns.ids(source.column);
    if source_ids.get(source.index).map(String::as_str) != Some(result.task_id.as_str()) {
        return Err(DragError::StaleSource {
            task_id: result.task_id.clone(),
            column: source.column,
            index: source.index,
        });
    }

    let mut start: Vec<String> = source_ids.to_vec();
    let moved = start.remove(source.index);

    if source.column == destination.column {
        let index = destination.index.min(start.len());
        start.insert(index, moved);
        return Ok(DropPlan::SameColumn {
            task_id: result.task_id.clone(),
            column: source.column,
            ids: start,
        });
    }

    let mut finish: Vec<String> = columns.ids(destination.column).to_vec();
    let index = destination.index.min(finish.len());
    finish.insert(index, moved);
    Ok(DropPlan::CrossColumn {
        task_id: result.task_id.clone(),
        source: source.column,
        source_ids: start,
        destination: destination.column,
        destination_ids: finish,
    })
}

/// Apply a plan to a projection (the optimistic local update)
pub fn apply_plan(columns: &mut ColumnProjection, plan: &DropPlan) {
    match plan {
        DropPlan::Unchanged | DropPlan::Invalid => {}
        DropPlan::SameColumn { column, ids, .. } => {
            columns.set_ids(*column, ids.clone());
        }
        DropPlan::CrossColumn {
            source,
            source_ids,
            destination,
            destination_ids,
            ..
        } => {
            columns.set_ids(*source, source_ids.clone());
            columns.set_ids(*destination, destination_ids.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence seam
// ---------------------------------------------------------------------------

/// Where the board sends its mutations after updating locally
pub trait BoardBackend {
    fn update_task_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), StoreError>;

    fn update_task_positions(
        &mut self,
        ordered_ids: &[String],
        column: Option<Column>,
    ) -> Result<(), StoreError>;

    /// Persist every effect of a drop. Implementations that can commit
    /// atomically should override this.
    fn commit_drop(&mut self, plan: &DropPlan) -> Result<(), StoreError> {
        match plan {
            DropPlan::Unchanged | DropPlan::Invalid => Ok(()),
            DropPlan::SameColumn { column, ids, .. } => {
                self.update_task_positions(ids, Some(*column))
            }
            DropPlan::CrossColumn {
                task_id,
                source,
                source_ids,
                destination,
                destination_ids,
            } => {
                self.update_task_status(task_id, destination.status())?;
                self.update_task_positions(source_ids, Some(*source))?;
                self.update_task_positions(destination_ids, Some(*destination))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Board view
// ---------------------------------------------------------------------------

/// The board's local view of one project: the projection it renders, updated
/// optimistically on drops and re-derived from the store on refresh.
#[derive(Debug, Clone)]
pub struct Board {
    project_id: String,
    columns: ColumnProjection,
}

impl Board {
    pub fn load(store: &TaskStore, project_id: &str) -> Result<Self, DragError> {
        let project = store
            .get_project(project_id)
            .ok_or_else(|| DragError::ProjectNotFound(project_id.to_string()))?;
        Ok(Board {
            project_id: project_id.to_string(),
            columns: project_columns(&project.tasks),
        })
    }

    pub fn columns(&self) -> &ColumnProjection {
        &self.columns
    }

    /// Re-derive the projection from canonical state
    pub fn refresh(&mut self, store: &TaskStore) -> Result<(), DragError> {
        let project = store
            .get_project(&self.project_id)
            .ok_or_else(|| DragError::ProjectNotFound(self.project_id.clone()))?;
        self.columns = project_columns(&project.tasks);
        Ok(())
    }

    /// Reconcile a drop: update the local projection, then persist through
    /// `backend`. If persisting fails the projection reverts and the error is
    /// returned.
    pub fn handle_drop<B: BoardBackend>(
        &mut self,
        backend: &mut B,
        result: &DragResult,
    ) -> Result<DropPlan, DragError> {
        let plan = plan_drop(&self.columns, result)?;
        if !plan.changes_board() {
            debug!("drop of {} changed nothing: {:?}", result.task_id, plan);
            return Ok(plan);
        }

        let previous = self.columns.clone();
        apply_plan(&mut self.columns, &plan);
        if let Err(e) = backend.commit_drop(&plan) {
            warn!("rolling back drop of {}: {}", result.task_id, e);
            self.columns = previous;
            return Err(DragError::RolledBack(e));
        }
        Ok(plan)
    }

    /// Move a task to `column` at `index`, starting from wherever it
    /// currently sits. With no index the task goes to the end of another
    /// column, or stays put when `column` is already its own.
    pub fn move_task<B: BoardBackend>(
        &mut self,
        backend: &mut B,
        task_id: &str,
        column: Column,
        index: Option<usize>,
    ) -> Result<DropPlan, DragError> {
        let (from_column, from_index) = self
            .columns
            .position_of(task_id)
            .ok_or_else(|| DragError::TaskNotFound(task_id.to_string()))?;
        let index = match index {
            Some(i) => i,
            None if column == from_column => from_index,
            None => self.columns.ids(column).len(),
        };
        let mut session = DragSession::new();
        session.start(task_id, DropLocation::new(from_column, from_index))?;
        let result = session.finish(Some(DropLocation::new(column, index)))?;
        self.handle_drop(backend, &result)
    }
}
