use chrono::Utc;
use log::{debug, warn};

use crate::model::board::Column;
use crate::model::config::BoardConfig;
use crate::model::conversation::{Conversation, Message};
use crate::model::member::{Member, MemberRef, Role};
use crate::model::notification::Notification;
use crate::model::organization::{Invite, Organization, OrganizationInput};
use crate::model::project::{Project, ProjectInput};
use crate::model::snapshot::Snapshot;
use crate::model::task::{Priority, Task, TaskInput, TaskStatus};
use crate::ops::drag::{BoardBackend, DropPlan};
use crate::ops::notify;
use crate::ops::reduce::{self, Ctx};

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("comment not found: {0}")]
    CommentNotFound(String),
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("organization not found: {0}")]
    OrganizationNotFound(String),
    #[error("invite not found: {0}")]
    InviteNotFound(String),
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("not allowed: {0}")]
    Forbidden(String),
    #[error("backend rejected write: {0}")]
    Backend(String),
}

/// Behavior knobs for the store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub compact_on_delete: bool,
    pub default_priority: Priority,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            compact_on_delete: true,
            default_priority: Priority::Medium,
        }
    }
}

impl From<&BoardConfig> for StoreOptions {
    fn from(config: &BoardConfig) -> Self {
        StoreOptions {
            compact_on_delete: config.compact_on_delete,
            default_priority: config.default_priority,
        }
    }
}

/// The single owner of all projects and tasks in a session.
///
/// Every mutation runs a reducer against a copy of the current snapshot and
/// commits the copy only if the reducer succeeds, so a failed operation never
/// leaves partial changes behind.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    snapshot: Snapshot,
    options: StoreOptions,
    actor: Option<MemberRef>,
}

impl TaskStore {
    pub fn new(options: StoreOptions) -> Self {
        TaskStore {
            snapshot: Snapshot::default(),
            options,
            actor: None,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, options: StoreOptions) -> Self {
        TaskStore {
            snapshot,
            options,
            actor: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Set the user mutations are attributed to. Notifications are only
    /// generated while an actor is set.
    pub fn set_actor(&mut self, actor: Option<MemberRef>) {
        self.actor = actor;
    }

    /// Run `f` against a copy of the snapshot; keep the copy only on success.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Snapshot, &Ctx<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let ctx = Ctx {
            now: Utc::now(),
            actor: self.actor.as_ref(),
            options: &self.options,
        };
        let mut next = self.snapshot.clone();
        match f(&mut next, &ctx) {
            Ok(out) => {
                self.snapshot = next;
                Ok(out)
            }
            Err(e) => {
                warn!("store operation rejected: {}", e);
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_projects(&self) -> &[Project] {
        &self.snapshot.projects
    }

    pub fn get_project(&self, project_id: &str) -> Option<&Project> {
        self.snapshot.project(project_id)
    }

    pub fn find_task(&self, task_id: &str) -> Option<(&Project, &Task)> {
        self.snapshot.find_task(task_id)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn add_project(&mut self, input: ProjectInput) -> Result<Project, StoreError> {
        self.transaction(|snap, ctx| reduce::add_project(snap, input, ctx))
    }

    pub fn update_project(&mut self, project: Project) -> Result<Project, StoreError> {
        self.transaction(|snap, _| reduce::update_project(snap, project))
    }

    pub fn delete_project(&mut self, project_id: &str) {
        // Infallible reducer
        let _ = self.transaction(|snap, _| {
            reduce::delete_project(snap, project_id);
            Ok(())
        });
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, project_id: &str, input: TaskInput) -> Result<Task, StoreError> {
        self.transaction(|snap, ctx| reduce::add_task(snap, project_id, input, ctx))
    }

    pub fn update_task(&mut self, task: Task) -> Result<Task, StoreError> {
        self.transaction(|snap, ctx| reduce::update_task(snap, task, ctx))
    }

    pub fn update_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), StoreError> {
        self.transaction(|snap, ctx| reduce::update_task_status(snap, task_id, status, ctx))
    }

    pub fn update_task_positions(&mut self, ordered_ids: &[String], column: Option<Column>) {
        let _ = self.transaction(|snap, _| {
            reduce::update_task_positions(snap, ordered_ids, column);
            Ok(())
        });
    }

    pub fn delete_task(&mut self, task_id: &str) {
        let _ = self.transaction(|snap, ctx| {
            reduce::delete_task(snap, task_id, ctx);
            Ok(())
        });
    }

    /// Renumber every column of a project to `0..n`. Returns how many tasks moved.
    pub fn compact_project(&mut self, project_id: &str) -> Result<usize, StoreError> {
        self.transaction(|snap, _| reduce::compact_project(snap, project_id))
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    pub fn add_member(&mut self, project_id: &str, member: Member) -> Result<(), StoreError> {
        self.transaction(|snap, ctx| reduce::add_member(snap, project_id, member, ctx))
    }

    pub fn update_member_role(
        &mut self,
        project_id: &str,
        member_id: &str,
        role: Role,
    ) -> Result<Member, StoreError> {
        self.transaction(|snap, _| reduce::update_member_role(snap, project_id, member_id, role))
    }

    pub fn remove_member(&mut self, project_id: &str, member_id: &str) -> Result<(), StoreError> {
        self.transaction(|snap, ctx| reduce::remove_member(snap, project_id, member_id, ctx))
    }

    // -----------------------------------------------------------------------
    // Organizations
    // -----------------------------------------------------------------------

    pub fn get_organizations(&self) -> &[Organization] {
        &self.snapshot.organizations
    }

    pub fn get_organization(&self, organization_id: &str) -> Option<&Organization> {
        self.snapshot.organization(organization_id)
    }

    /// Projects that belong to an organization
    pub fn organization_projects(&self, organization_id: &str) -> Vec<&Project> {
        self.snapshot
            .projects
            .iter()
            .filter(|p| p.organization.id == organization_id)
            .collect()
    }

    pub fn add_organization(
        &mut self,
        input: OrganizationInput,
    ) -> Result<Organization, StoreError> {
        self.transaction(|snap, ctx| reduce::add_organization(snap, input, ctx))
    }

    pub fn update_organization(&mut self, org: Organization) -> Result<Organization, StoreError> {
        self.transaction(|snap, _| reduce::update_organization(snap, org))
    }

    /// Idempotent. Returns how many projects went with the organization.
    pub fn delete_organization(&mut self, organization_id: &str) -> usize {
        self.transaction(|snap, _| Ok(reduce::delete_organization(snap, organization_id)))
            .unwrap_or(0)
    }

    pub fn add_organization_member(
        &mut self,
        organization_id: &str,
        member: Member,
    ) -> Result<(), StoreError> {
        self.transaction(|snap, _| reduce::add_organization_member(snap, organization_id, member))
    }

    pub fn update_organization_member_role(
        &mut self,
        organization_id: &str,
        member_id: &str,
        role: Role,
    ) -> Result<Member, StoreError> {
        self.transaction(|snap, _| {
            reduce::update_organization_member_role(snap, organization_id, member_id, role)
        })
    }

    pub fn remove_organization_member(
        &mut self,
        organization_id: &str,
        member_id: &str,
    ) -> Result<(), StoreError> {
        self.transaction(|snap, _| {
            reduce::remove_organization_member(snap, organization_id, member_id)
        })
    }

    pub fn invite_member(
        &mut self,
        organization_id: &str,
        invitee: MemberRef,
        role: Role,
    ) -> Result<Invite, StoreError> {
        self.transaction(|snap, ctx| {
            reduce::invite_member(snap, organization_id, invitee, role, ctx)
        })
    }

    pub fn accept_invite(
        &mut self,
        organization_id: &str,
        invite_id: &str,
    ) -> Result<Member, StoreError> {
        self.transaction(|snap, _| reduce::accept_invite(snap, organization_id, invite_id))
    }

    // -----------------------------------------------------------------------
    // Conversations
    // -----------------------------------------------------------------------

    /// Conversations `member_id` takes part in, most recently active first
    pub fn conversations_for(&self, member_id: &str) -> Vec<&Conversation> {
        let mut list: Vec<&Conversation> = self
            .snapshot
            .conversations
            .iter()
            .filter(|c| c.has_participant(member_id))
            .collect();
        list.sort_by_key(|c| {
            std::cmp::Reverse(c.last_message().map_or(c.created_at, |m| m.sent_at))
        });
        list
    }

    pub fn get_conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.snapshot.conversation(conversation_id)
    }

    pub fn start_conversation(
        &mut self,
        starter: MemberRef,
        target: MemberRef,
        organization_id: Option<&str>,
    ) -> Result<Conversation, StoreError> {
        self.transaction(|snap, ctx| {
            reduce::start_conversation(snap, starter, target, organization_id, ctx)
        })
    }

    pub fn send_message(
        &mut self,
        conversation_id: &str,
        sender: &MemberRef,
        text: &str,
    ) -> Result<Option<Message>, StoreError> {
        self.transaction(|snap, ctx| {
            reduce::send_message(snap, conversation_id, sender, text, ctx)
        })
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub fn notifications_for(&self, recipient_id: &str) -> Vec<&Notification> {
        notify::notifications_for(&self.snapshot, recipient_id)
    }

    pub fn unread_count(&self, recipient_id: &str) -> usize {
        notify::unread_count(&self.snapshot, recipient_id)
    }

    pub fn mark_read(&mut self, notification_id: &str) -> bool {
        notify::mark_read(&mut self.snapshot, notification_id)
    }

    pub fn mark_all_read(&mut self, recipient_id: &str) -> usize {
        notify::mark_all_read(&mut self.snapshot, recipient_id)
    }

    pub fn dismiss(&mut self, notification_id: &str) -> bool {
        notify::dismiss(&mut self.snapshot, notification_id)
    }
}

impl BoardBackend for TaskStore {
    fn update_task_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), StoreError> {
        TaskStore::update_task_status(self, task_id, status)
    }

    fn update_task_positions(
        &mut self,
        ordered_ids: &[String],
        column: Option<Column>,
    ) -> Result<(), StoreError> {
        TaskStore::update_task_positions(self, ordered_ids, column);
        Ok(())
    }

    /// All effects of a drop commit together or not at all.
    fn commit_drop(&mut self, plan: &DropPlan) -> Result<(), StoreError> {
        debug!("committing drop: {:?}", plan);
        self.transaction(|snap, ctx| {
            match plan {
                DropPlan::Unchanged | DropPlan::Invalid => {}
                DropPlan::SameColumn { column, ids, .. } => {
                    reduce::update_task_positions(snap, ids, Some(*column));
                }
                DropPlan::CrossColumn {
                    task_id,
                    source,
                    source_ids,
                    destination,
                    destination_ids,
                } => {
                    reduce::update_task_status(snap, task_id, destination.status(), ctx)?;
                    reduce::update_task_positions(snap, source_ids, Some(*source));
                    reduce::update_task_positions(snap, destination_ids, Some(*destination));
                }
            }
            Ok(())
        })
    }
}
