use chrono::{NaiveDate, Utc};
use log::debug;

use crate::model::board::Column;
use crate::model::member::{Member, MemberRef};
use crate::model::task::{Comment, Priority, Task};
use crate::ops::access;
use crate::ops::store::{StoreError, TaskStore};

/// Editable fields of a task. Status is held as a board column and mapped
/// back to a task status on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub column: Column,
    pub priority: Priority,
    pub assigned_to: Option<MemberRef>,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    fn from_task(task: &Task) -> Self {
        TaskDraft {
            title: task.title.clone(),
            description: task.description.clone(),
            column: task.status.column(),
            priority: task.priority,
            assigned_to: task.assigned_to.clone(),
            due_date: task.due_date,
        }
    }

    fn apply_to(&self, task: &mut Task) {
        task.title = self.title.clone();
        task.description = self.description.clone();
        task.status = self.column.status();
        task.priority = self.priority;
        task.assigned_to = self.assigned_to.clone();
        task.due_date = self.due_date;
    }
}

/// Reported by [`TaskDetail::save`] so the board knows whether to move the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub status_changed: bool,
    pub column: Column,
}

/// An open editor for a single task
#[derive(Debug, Clone)]
pub struct TaskDetail {
    actor: Member,
    task: Task,
    pub draft: TaskDraft,
}

impl TaskDetail {
    pub fn open(store: &TaskStore, task_id: &str, actor: Member) -> Result<Self, StoreError> {
        let (_, task) = store
            .find_task(task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
        Ok(TaskDetail {
            actor,
            draft: TaskDraft::from_task(task),
            task: task.clone(),
        })
    }

    /// The task as last read from or written to the store
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn comments(&self) -> &[Comment] {
        &self.task.comments
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != TaskDraft::from_task(&self.task)
    }

    /// Fetch the stored copy of the task, so comment edits never carry
    /// unsaved draft fields along with them.
    fn canonical(&self, store: &TaskStore) -> Result<Task, StoreError> {
        store
            .find_task(&self.task.id)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| StoreError::TaskNotFound(self.task.id.clone()))
    }

    /// Write the draft back as a whole-task update
    pub fn save(&mut self, store: &mut TaskStore) -> Result<SaveOutcome, StoreError> {
        let mut task = self.canonical(store)?;
        let previous = task.status;
        self.draft.apply_to(&mut task);
        let stored = store.update_task(task)?;

        let outcome = SaveOutcome {
            status_changed: stored.status != previous,
            column: stored.status.column(),
        };
        debug!("saved task {} ({:?})", stored.id, outcome);
        self.draft = TaskDraft::from_task(&stored);
        self.task = stored;
        Ok(outcome)
    }

    /// Append a comment by the actor. Blank text is ignored.
    pub fn add_comment(
        &mut self,
        store: &mut TaskStore,
        text: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            comment_text: text.to_string(),
            commented_by: self.actor.to_ref(),
            created_at: Utc::now(),
        };
        let mut task = self.canonical(store)?;
        task.comments.push(comment.clone());
        let stored = store.update_task(task)?;
        self.task.comments = stored.comments;
        self.task.updated_at = stored.updated_at;
        Ok(Some(comment))
    }

    /// Remove a comment. Only its author or a moderator may do this.
    pub fn delete_comment(&mut self, store: &mut TaskStore, comment_id: &str) -> Result<(), StoreError> {
        let mut task = self.canonical(store)?;
        let comment = task
            .comment(comment_id)
            .ok_or_else(|| StoreError::CommentNotFound(comment_id.to_string()))?;
        if !access::can_delete_comment(&self.actor, comment) {
            return Err(StoreError::Forbidden(format!(
                "{} cannot delete a comment by {}",
                self.actor.full_name, comment.commented_by.full_name
            )));
        }
        task.comments.retain(|c| c.id != comment_id);
        let stored = store.update_task(task)?;
        self.task.comments = stored.comments;
        self.task.updated_at = stored.updated_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::member::Role;
    use crate::model::project::ProjectInput;
    use crate::model::task::{TaskInput, TaskStatus};

    fn john() -> Member {
        Member::new("user1", "John Doe", Role::Manager)
    }

    fn jane() -> Member {
        Member::new("user2", "Jane Smith", Role::Employee)
    }

    fn setup() -> (TaskStore, String) {
        let mut store = TaskStore::default();
        let mut input = ProjectInput::new("Website Redesign", "org1");
        input.members = vec![john(), jane()];
        let pid = store.add_project(input).unwrap().id;
        let task = store.add_task(&pid, TaskInput::new("Create wireframes")).unwrap();
        (store, task.id)
    }

    #[test]
    fn test_open_maps_status_to_column() {
        let (mut store, id) = setup();
        store.update_task_status(&id, TaskStatus::InProgress).unwrap();
        let detail = TaskDetail::open(&store, &id, john()).unwrap();
        assert_eq!(detail.draft.column, Column::InProgress);
        assert!(!detail.is_dirty());
        assert!(matches!(
            TaskDetail::open(&store, "ghost", john()),
            Err(StoreError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_save_reports_column_change() {
        let (mut store, id) = setup();
        let mut detail = TaskDetail::open(&store, &id, john()).unwrap();
        detail.draft.column = Column::Done;
        detail.draft.priority = Priority::High;
        assert!(detail.is_dirty());
        let outcome = detail.save(&mut store).unwrap();
        assert_eq!(
            outcome,
            SaveOutcome {
                status_changed: true,
                column: Column::Done
            }
        );
        let (_, task) = store.find_task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, Priority::High);
        assert!(!detail.is_dirty());

        detail.draft.description = "More".into();
        assert!(!detail.save(&mut store).unwrap().status_changed);
    }

    #[test]
    fn test_save_status_change_appends_and_closes_gap() {
        let (mut store, first) = setup();
        let pid = store.find_task(&first).unwrap().0.id.clone();
        let second = store.add_task(&pid, TaskInput::new("Second")).unwrap().id;
        let third = store.add_task(&pid, TaskInput::new("Third")).unwrap().id;
        let done = store
            .add_task(&pid, TaskInput::new("Shipped").with_status(TaskStatus::Completed))
            .unwrap()
            .id;

        let mut detail = TaskDetail::open(&store, &second, john()).unwrap();
        detail.draft.column = Column::Done;
        detail.save(&mut store).unwrap();

        let project = store.get_project(&pid).unwrap();
        assert_eq!(project.task(&first).unwrap().order, 0);
        assert_eq!(project.task(&third).unwrap().order, 1);
        assert_eq!(project.task(&done).unwrap().order, 0);
        assert_eq!(project.task(&second).unwrap().order, 1);
        assert_eq!(detail.task.order, 1);
    }

    #[test]
    fn test_save_rejects_non_member_assignee() {
        let (mut store, id) = setup();
        let mut detail = TaskDetail::open(&store, &id, john()).unwrap();
        detail.draft.assigned_to = Some(MemberRef::new("user9", "Stranger"));
        assert!(matches!(detail.save(&mut store), Err(StoreError::Validation(_))));
        assert!(store.find_task(&id).unwrap().1.assigned_to.is_none());
    }

    #[test]
    fn test_blank_comment_is_ignored() {
        let (mut store, id) = setup();
        let mut detail = TaskDetail::open(&store, &id, jane()).unwrap();
        assert_eq!(detail.add_comment(&mut store, "   \n").unwrap(), None);
        assert!(store.find_task(&id).unwrap().1.comments.is_empty());
    }

    #[test]
    fn test_comment_does_not_save_draft() {
        let (mut store, id) = setup();
        let mut detail = TaskDetail::open(&store, &id, jane()).unwrap();
        detail.draft.title = "Unsaved title".into();
        let comment = detail.add_comment(&mut store, "hello").unwrap().unwrap();

        let (_, task) = store.find_task(&id).unwrap();
        assert_eq!(task.title, "Create wireframes");
        assert_eq!(task.comments.last(), Some(&comment));
        assert_eq!(comment.commented_by.id, "user2");
        assert!(detail.is_dirty());
    }

    #[test]
    fn test_delete_comment_permissions() {
        let (mut store, id) = setup();
        let mut by_jane = TaskDetail::open(&store, &id, jane()).unwrap();
        let comment = by_jane.add_comment(&mut store, "hello").unwrap().unwrap();

        let outsider = Member::new("user3", "Jim Beam", Role::Employee);
        let mut by_other = TaskDetail::open(&store, &id, outsider).unwrap();
        assert!(matches!(
            by_other.delete_comment(&mut store, &comment.id),
            Err(StoreError::Forbidden(_))
        ));

        let mut by_manager = TaskDetail::open(&store, &id, john()).unwrap();
        by_manager.delete_comment(&mut store, &comment.id).unwrap();
        assert!(store.find_task(&id).unwrap().1.comments.is_empty());
        assert_eq!(
            by_manager.delete_comment(&mut store, &comment.id),
            Err(StoreError::CommentNotFound(comment.id.clone()))
        );
    }
}
