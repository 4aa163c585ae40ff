//! Board-level properties checked against the library: drags, deletes,
//! validation, comments, and the column/status mapping.

use pretty_assertions::assert_eq;

use taskboard::model::board::Column;
use taskboard::model::member::{Member, Role};
use taskboard::model::project::ProjectInput;
use taskboard::model::task::{TaskInput, TaskStatus};
use taskboard::ops::detail::TaskDetail;
use taskboard::ops::drag::{Board, DragSession, DropLocation, DropPlan};
use taskboard::ops::projection::project_columns;
use taskboard::ops::store::{StoreError, StoreOptions, TaskStore};

fn manager() -> Member {
    Member::new("user1", "John Doe", Role::Manager)
}

/// A project whose todo column holds A, B, C, D in that order.
fn board_with_four() -> (TaskStore, String, Vec<String>) {
    let mut store = TaskStore::new(StoreOptions::default());
    let mut input = ProjectInput::new("Website Redesign", "org1");
    input.members = vec![manager()];
    let pid = store.add_project(input).unwrap().id;
    let ids = ["A", "B", "C", "D"]
        .into_iter()
        .map(|title| store.add_task(&pid, TaskInput::new(title)).unwrap().id)
        .collect();
    (store, pid, ids)
}

fn column(store: &TaskStore, pid: &str, column: Column) -> Vec<String> {
    let project = store.get_project(pid).unwrap();
    project_columns(&project.tasks).ids(column).to_vec()
}

#[test]
fn reorder_within_column_preserves_members() {
    let (mut store, pid, ids) = board_with_four();
    let mut board = Board::load(&store, &pid).unwrap();

    let mut session = DragSession::new();
    session
        .start(&ids[1], DropLocation::new(Column::Todo, 1))
        .unwrap();
    let result = session
        .finish(Some(DropLocation::new(Column::Todo, 2)))
        .unwrap();
    let plan = board.handle_drop(&mut store, &result).unwrap();
    assert!(matches!(plan, DropPlan::SameColumn { .. }));

    let expected = vec![
        ids[0].clone(),
        ids[2].clone(),
        ids[1].clone(),
        ids[3].clone(),
    ];
    assert_eq!(board.columns().ids(Column::Todo), expected.as_slice());
    assert_eq!(column(&store, &pid, Column::Todo), expected);
}

#[test]
fn cross_column_move_updates_status_once() {
    let (mut store, pid, ids) = board_with_four();
    let mut board = Board::load(&store, &pid).unwrap();
    board
        .move_task(&mut store, &ids[0], Column::Done, Some(0))
        .unwrap();

    let (_, task) = store.find_task(&ids[0]).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);

    let project = store.get_project(&pid).unwrap();
    let projection = project_columns(&project.tasks);
    let appearances: usize = projection
        .iter()
        .map(|(_, col)| col.iter().filter(|id| **id == ids[0]).count())
        .sum();
    assert_eq!(appearances, 1);
    assert_eq!(projection.column_of(&ids[0]), Some(Column::Done));
    assert_eq!(board.columns(), &projection);
}

#[test]
fn delete_task_is_idempotent() {
    let (mut store, pid, ids) = board_with_four();
    store.delete_task(&ids[2]);
    store.delete_task(&ids[2]);

    assert!(store.find_task(&ids[2]).is_none());
    let project = store.get_project(&pid).unwrap();
    let projection = project_columns(&project.tasks);
    assert_eq!(projection.column_of(&ids[2]), None);
    assert_eq!(projection.len(), 3);
}

#[test]
fn add_project_without_name_is_rejected() {
    let mut store = TaskStore::new(StoreOptions::default());
    store
        .add_project(ProjectInput::new("Existing", "org1"))
        .unwrap();

    let mut input = ProjectInput::new("", "org1");
    input.description = "x".into();
    let err = store.add_project(input).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_projects().len(), 1);
}

#[test]
fn comment_add_then_delete_restores_length() {
    let (mut store, _pid, ids) = board_with_four();
    let mut detail = TaskDetail::open(&store, &ids[0], manager()).unwrap();
    let before = detail.comments().len();

    let comment = detail
        .add_comment(&mut store, "hello")
        .unwrap()
        .unwrap();
    let (_, task) = store.find_task(&ids[0]).unwrap();
    assert_eq!(task.comments.last().unwrap().comment_text, "hello");

    detail.delete_comment(&mut store, &comment.id).unwrap();
    let (_, task) = store.find_task(&ids[0]).unwrap();
    assert_eq!(task.comments.len(), before);
}

#[test]
fn column_status_mapping_is_a_bijection() {
    for column in Column::ALL {
        let matches: Vec<TaskStatus> = TaskStatus::ALL
            .into_iter()
            .filter(|s| s.column() == column)
            .collect();
        assert_eq!(matches, vec![column.status()]);
        assert_eq!(Column::from_status(column.status()), column);
    }
    for status in TaskStatus::ALL {
        assert_eq!(status.column().status(), status);
    }
}

#[test]
fn unrelated_update_keeps_order_and_column() {
    let (mut store, pid, ids) = board_with_four();
    let (_, before) = store.find_task(&ids[2]).unwrap();
    let before = before.clone();

    let mut task = before.clone();
    task.description = "now with details".into();
    let stored = store.update_task(task).unwrap();

    assert_eq!(stored.order, before.order);
    assert_eq!(stored.status, before.status);
    assert_eq!(column(&store, &pid, Column::Todo), ids);
}
