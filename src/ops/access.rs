//! Capability checks. Every role decision in the crate goes through one of
//! these functions; call sites never compare roles directly.
//!
//! These are client-side rules. A shared backend must enforce them again.

use crate::model::member::{Member, Role};
use crate::model::task::{Comment, Task};

/// Create, edit, and delete tasks
pub fn can_manage_tasks(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Manager)
}

/// Add, remove, and change the role of project members
pub fn can_manage_members(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Manager)
}

/// Delete a whole organization, projects included
pub fn can_delete_organization(role: Role) -> bool {
    role == Role::Admin
}

/// Edit or delete other people's comments
pub fn can_moderate_comments(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Manager)
}

pub fn can_delete_comment(actor: &Member, comment: &Comment) -> bool {
    comment.commented_by.id == actor.id || can_moderate_comments(actor.role)
}

/// Managers may move any task; others only the tasks assigned to them.
pub fn can_change_status(actor: &Member, task: &Task) -> bool {
    can_manage_tasks(actor.role) || task.is_assigned_to(&actor.id)
}
