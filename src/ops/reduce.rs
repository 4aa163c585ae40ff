//! Snapshot reducers. Each takes the snapshot by `&mut` and either applies a
//! complete change or returns an error; [`TaskStore`](crate::ops::store::TaskStore)
//! runs them against a copy so an error discards partial work.

use chrono::{DateTime, Utc};
use log::debug;

use crate::model::board::Column;
use crate::model::conversation::{Conversation, Message};
use crate::model::member::{Member, MemberRef, Role};
use crate::model::organization::{Invite, Organization, OrganizationInput};
use crate::model::project::{OrganizationRef, Project, ProjectInput};
use crate::model::snapshot::Snapshot;
use crate::model::task::{Task, TaskInput, TaskStatus};
use crate::ops::clean;
use crate::ops::notify;
use crate::ops::store::{StoreError, StoreOptions};

/// Per-operation context
#[derive(Debug, Clone, Copy)]
pub struct Ctx<'a> {
    pub now: DateTime<Utc>,
    pub actor: Option<&'a MemberRef>,
    pub options: &'a StoreOptions,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_assignee(project: &Project, assignee: Option<&MemberRef>) -> Result<(), StoreError> {
    match assignee {
        Some(m) if !project.is_member(&m.id) => Err(StoreError::Validation(format!(
            "{} is not a member of project {}",
            m.full_name, project.name
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub fn add_project(
    snap: &mut Snapshot,
    input: ProjectInput,
    ctx: &Ctx<'_>,
) -> Result<Project, StoreError> {
    if is_blank(&input.name) || is_blank(&input.organization_id) {
        return Err(StoreError::Validation(
            "project name and organization id are required".into(),
        ));
    }
    let created_by = input
        .created_by
        .or_else(|| ctx.actor.cloned())
        .unwrap_or_else(|| MemberRef::new("unknown", "Unknown User"));

    let organization_id = input.organization_id.trim().to_string();
    let organization = match snap.organization(&organization_id) {
        Some(org) => org.to_ref(),
        None => OrganizationRef {
            name: input
                .organization_name
                .filter(|n| !is_blank(n))
                .unwrap_or_else(|| "Unknown Organization".to_string()),
            id: organization_id,
        },
    };

    let project = Project {
        id: new_id(),
        name: input.name.trim().to_string(),
        description: input.description,
        organization,
        created_by,
        members: input.members,
        tasks: input.tasks,
    };
    debug!("added project {} ({})", project.id, project.name);
    snap.projects.push(project.clone());
    Ok(project)
}

pub fn update_project(snap: &mut Snapshot, project: Project) -> Result<Project, StoreError> {
    if is_blank(&project.id) || is_blank(&project.name) {
        return Err(StoreError::Validation(
            "project id and name are required for update".into(),
        ));
    }
    let slot = snap
        .project_mut(&project.id)
        .ok_or_else(|| StoreError::ProjectNotFound(project.id.clone()))?;
    *slot = project.clone();
    debug!("replaced project {}", project.id);
    Ok(project)
}

pub fn delete_project(snap: &mut Snapshot, project_id: &str) {
    let before = snap.projects.len();
    snap.projects.retain(|p| p.id != project_id);
    if snap.projects.len() == before {
        debug!("delete_project: {} not present", project_id);
        return;
    }
    notify::drop_for_project(snap, project_id);
    debug!("deleted project {}", project_id);
}

pub fn compact_project(snap: &mut Snapshot, project_id: &str) -> Result<usize, StoreError> {
    let project = snap
        .project_mut(project_id)
        .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
    Ok(clean::compact_orders(project))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub fn add_task(
    snap: &mut Snapshot,
    project_id: &str,
    input: TaskInput,
    ctx: &Ctx<'_>,
) -> Result<Task, StoreError> {
    if is_blank(&input.title) {
        return Err(StoreError::Validation("task title is required".into()));
    }
    let id = input.id.filter(|id| !is_blank(id)).unwrap_or_else(new_id);
    if snap.find_task(&id).is_some() {
        return Err(StoreError::Validation(format!("task id already exists: {}", id)));
    }

    let project = snap
        .project_mut(project_id)
        .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
    check_assignee(project, input.assigned_to.as_ref())?;

    let status = input.status.unwrap_or(TaskStatus::Todo);
    let order = input.order.unwrap_or_else(|| {
        project.tasks.iter().filter(|t| t.status == status).count() as u32
    });
    let created_by = input
        .created_by
        .or_else(|| ctx.actor.cloned())
        .unwrap_or_else(|| project.created_by.clone());

    let task = Task {
        id,
        title: input.title.trim().to_string(),
        description: input.description,
        status,
        priority: input.priority.unwrap_or(ctx.options.default_priority),
        assigned_to: input.assigned_to,
        created_by,
        due_date: input.due_date,
        order,
        created_at: ctx.now,
        updated_at: ctx.now,
        comments: input.comments,
    };
    project.tasks.push(task.clone());

    let notes = match ctx.actor {
        Some(actor) => notify::task_change_notifications(project, None, &task, actor, ctx.now),
        None => Vec::new(),
    };
    snap.notifications.extend(notes);
    debug!("added task {} to project {}", task.id, project_id);
    Ok(task)
}

/// Replace a task wholesale (last write wins).
///
/// A task whose status changes goes to the end of its new column, and the
/// column it left is renumbered.
pub fn update_task(snap: &mut Snapshot, mut task: Task, ctx: &Ctx<'_>) -> Result<Task, StoreError> {
    if is_blank(&task.id) {
        return Err(StoreError::Validation("task id is required for update".into()));
    }
    if is_blank(&task.title) {
        return Err(StoreError::Validation("task title is required".into()));
    }
    let project = snap
        .task_owner_mut(&task.id)
        .ok_or_else(|| StoreError::TaskNotFound(task.id.clone()))?;
    check_assignee(project, task.assigned_to.as_ref())?;

    let previous_status = project
        .task(&task.id)
        .map(|t| t.status)
        .ok_or_else(|| StoreError::TaskNotFound(task.id.clone()))?;
    if previous_status != task.status {
        task.order = project
            .tasks
            .iter()
            .filter(|t| t.status == task.status && t.id != task.id)
            .map(|t| t.order + 1)
            .max()
            .unwrap_or(0);
    }

    task.updated_at = ctx.now;
    let slot = project
        .task_mut(&task.id)
        .ok_or_else(|| StoreError::TaskNotFound(task.id.clone()))?;
    let before = std::mem::replace(slot, task.clone());
    if before.status != task.status {
        clean::compact_column(project, before.status.column());
    }

    let notes = match ctx.actor {
        Some(actor) => {
            notify::task_change_notifications(project, Some(&before), &task, actor, ctx.now)
        }
        None => Vec::new(),
    };
    snap.notifications.extend(notes);
    debug!("updated task {}", task.id);
    Ok(task)
}

/// Change only `status` and `updated_at`
pub fn update_task_status(
    snap: &mut Snapshot,
    task_id: &str,
    status: TaskStatus,
    ctx: &Ctx<'_>,
) -> Result<(), StoreError> {
    let project = snap
        .task_owner_mut(task_id)
        .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
    let task = project
        .task_mut(task_id)
        .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
    if task.status == status {
        return Ok(());
    }
    let before = task.clone();
    task.status = status;
    task.updated_at = ctx.now;
    let after = task.clone();

    let notes = match ctx.actor {
        Some(actor) => {
            notify::task_change_notifications(project, Some(&before), &after, actor, ctx.now)
        }
        None => Vec::new(),
    };
    snap.notifications.extend(notes);
    debug!("task {} status {} -> {}", task_id, before.status, status);
    Ok(())
}

/// Set each listed task's `order` to its index in `ordered_ids`.
///
/// Unlisted tasks keep their order. Unknown ids are skipped, as are ids whose
/// status does not belong to `column` when one is given.
pub fn update_task_positions(snap: &mut Snapshot, ordered_ids: &[String], column: Option<Column>) {
    for (index, task_id) in ordered_ids.iter().enumerate() {
        let Some(task) = snap
            .projects
            .iter_mut()
            .find_map(|p| p.task_mut(task_id))
        else {
            debug!("update_task_positions: unknown task {}", task_id);
            continue;
        };
        if let Some(col) = column
            && task.status.column() != col
        {
            debug!(
                "update_task_positions: task {} is in {}, not {}",
                task_id,
                task.status.column(),
                col
            );
            continue;
        }
        task.order = index as u32;
    }
}

pub fn delete_task(snap: &mut Snapshot, task_id: &str, ctx: &Ctx<'_>) {
    let Some(project) = snap.task_owner_mut(task_id) else {
        debug!("delete_task: {} not present", task_id);
        return;
    };
    let Some(idx) = project.tasks.iter().position(|t| t.id == task_id) else {
        return;
    };
    let removed = project.tasks.remove(idx);
    if ctx.options.compact_on_delete {
        clean::compact_column(project, removed.status.column());
    }
    notify::drop_for_task(snap, task_id);
    debug!("deleted task {}", task_id);
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

pub fn add_member(
    snap: &mut Snapshot,
    project_id: &str,
    member: Member,
    ctx: &Ctx<'_>,
) -> Result<(), StoreError> {
    if is_blank(&member.id) || is_blank(&member.full_name) {
        return Err(StoreError::Validation("member id and name are required".into()));
    }
    let project = snap
        .project_mut(project_id)
        .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
    if project.is_member(&member.id) {
        return Err(StoreError::Validation(format!(
            "{} is already a member of {}",
            member.full_name, project.name
        )));
    }
    let note = ctx
        .actor
        .and_then(|actor| notify::member_added_notification(project, &member, actor, ctx.now));
    debug!("added member {} to project {}", member.id, project_id);
    project.members.push(member);
    snap.notifications.extend(note);
    Ok(())
}

pub fn update_member_role(
    snap: &mut Snapshot,
    project_id: &str,
    member_id: &str,
    role: Role,
) -> Result<Member, StoreError> {
    let project = snap
        .project_mut(project_id)
        .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
    let member = project
        .members
        .iter_mut()
        .find(|m| m.id == member_id)
        .ok_or_else(|| StoreError::MemberNotFound(member_id.to_string()))?;
    member.role = role;
    debug!("member {} of {} is now {}", member_id, project_id, role);
    Ok(member.clone())
}

/// Remove a member; their tasks become unassigned
pub fn remove_member(
    snap: &mut Snapshot,
    project_id: &str,
    member_id: &str,
    ctx: &Ctx<'_>,
) -> Result<(), StoreError> {
    let project = snap
        .project_mut(project_id)
        .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
    project.members.retain(|m| m.id != member_id);
    for task in project
        .tasks
        .iter_mut()
        .filter(|t| t.is_assigned_to(member_id))
    {
        task.assigned_to = None;
        task.updated_at = ctx.now;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

pub fn add_organization(
    snap: &mut Snapshot,
    input: OrganizationInput,
    ctx: &Ctx<'_>,
) -> Result<Organization, StoreError> {
    if is_blank(&input.name) {
        return Err(StoreError::Validation("organization name is required".into()));
    }
    let id = input.id.filter(|id| !is_blank(id)).unwrap_or_else(new_id);
    if snap.organization(&id).is_some() {
        return Err(StoreError::Validation(format!(
            "organization id already exists: {}",
            id
        )));
    }
    let org = Organization {
        id,
        name: input.name.trim().to_string(),
        description: input.description,
        members: input.members,
        invites: Vec::new(),
        created_at: ctx.now,
    };
    debug!("added organization {} ({})", org.id, org.name);
    snap.organizations.push(org.clone());
    Ok(org)
}

/// Replace an organization wholesale. A rename is copied into the
/// organization reference of every project that belongs to it.
pub fn update_organization(
    snap: &mut Snapshot,
    org: Organization,
) -> Result<Organization, StoreError> {
    if is_blank(&org.id) || is_blank(&org.name) {
        return Err(StoreError::Validation(
            "organization id and name are required for update".into(),
        ));
    }
    let slot = snap
        .organization_mut(&org.id)
        .ok_or_else(|| StoreError::OrganizationNotFound(org.id.clone()))?;
    *slot = org.clone();
    for project in snap
        .projects
        .iter_mut()
        .filter(|p| p.organization.id == org.id)
    {
        project.organization.name = org.name.clone();
    }
    debug!("replaced organization {}", org.id);
    Ok(org)
}

/// Delete an organization with its projects and conversations. Returns the
/// number of projects removed.
pub fn delete_organization(snap: &mut Snapshot, organization_id: &str) -> usize {
    let doomed: Vec<String> = snap
        .projects
        .iter()
        .filter(|p| p.organization.id == organization_id)
        .map(|p| p.id.clone())
        .collect();
    for project_id in &doomed {
        delete_project(snap, project_id);
    }

    let before = snap.organizations.len();
    snap.organizations.retain(|o| o.id != organization_id);
    snap.conversations
        .retain(|c| c.organization_id.as_deref() != Some(organization_id));
    notify::drop_for_organization(snap, organization_id);
    if snap.organizations.len() == before {
        debug!("delete_organization: {} not present", organization_id);
    } else {
        debug!(
            "deleted organization {} and {} projects",
            organization_id,
            doomed.len()
        );
    }
    doomed.len()
}

fn organization_mut<'a>(
    snap: &'a mut Snapshot,
    organization_id: &str,
) -> Result<&'a mut Organization, StoreError> {
    snap.organization_mut(organization_id)
        .ok_or_else(|| StoreError::OrganizationNotFound(organization_id.to_string()))
}

pub fn add_organization_member(
    snap: &mut Snapshot,
    organization_id: &str,
    member: Member,
) -> Result<(), StoreError> {
    if is_blank(&member.id) || is_blank(&member.full_name) {
        return Err(StoreError::Validation("member id and name are required".into()));
    }
    let org = organization_mut(snap, organization_id)?;
    if org.is_member(&member.id) {
        return Err(StoreError::Validation(format!(
            "{} is already a member of {}",
            member.full_name, org.name
        )));
    }
    debug!("added member {} to organization {}", member.id, organization_id);
    org.members.push(member);
    Ok(())
}

pub fn update_organization_member_role(
    snap: &mut Snapshot,
    organization_id: &str,
    member_id: &str,
    role: Role,
) -> Result<Member, StoreError> {
    let org = organization_mut(snap, organization_id)?;
    let member = org
        .members
        .iter_mut()
        .find(|m| m.id == member_id)
        .ok_or_else(|| StoreError::MemberNotFound(member_id.to_string()))?;
    member.role = role;
    Ok(member.clone())
}

/// Idempotent for a member who is already gone
pub fn remove_organization_member(
    snap: &mut Snapshot,
    organization_id: &str,
    member_id: &str,
) -> Result<(), StoreError> {
    let org = organization_mut(snap, organization_id)?;
    org.members.retain(|m| m.id != member_id);
    Ok(())
}

/// Record an open invite. The invitee becomes a member only on
/// [`accept_invite`].
pub fn invite_member(
    snap: &mut Snapshot,
    organization_id: &str,
    invitee: MemberRef,
    role: Role,
    ctx: &Ctx<'_>,
) -> Result<Invite, StoreError> {
    if is_blank(&invitee.id) || is_blank(&invitee.full_name) {
        return Err(StoreError::Validation("invitee id and name are required".into()));
    }
    let org = organization_mut(snap, organization_id)?;
    if org.is_member(&invitee.id) {
        return Err(StoreError::Validation(format!(
            "{} is already a member of {}",
            invitee.full_name, org.name
        )));
    }
    if org.pending_invite_for(&invitee.id).is_some() {
        return Err(StoreError::Validation(format!(
            "{} already has an open invite to {}",
            invitee.full_name, org.name
        )));
    }
    let invite = Invite {
        id: new_id(),
        invitee,
        role,
        invited_by: ctx
            .actor
            .cloned()
            .unwrap_or_else(|| MemberRef::new("unknown", "Unknown User")),
        accepted: false,
        created_at: ctx.now,
    };
    org.invites.push(invite.clone());
    let note = ctx
        .actor
        .and_then(|_| notify::organization_invite_notification(org, &invite, ctx.now));
    snap.notifications.extend(note);
    debug!("invited {} to organization {}", invite.invitee.id, organization_id);
    Ok(invite)
}

/// Accept an open invite, adding the invitee with the invited role
pub fn accept_invite(
    snap: &mut Snapshot,
    organization_id: &str,
    invite_id: &str,
) -> Result<Member, StoreError> {
    let org = organization_mut(snap, organization_id)?;
    let invite = org
        .invites
        .iter_mut()
        .find(|i| i.id == invite_id)
        .ok_or_else(|| StoreError::InviteNotFound(invite_id.to_string()))?;
    if invite.accepted {
        return Err(StoreError::Validation(format!(
            "invite {} was already accepted",
            invite_id
        )));
    }
    invite.accepted = true;
    let member = Member::new(
        invite.invitee.id.clone(),
        invite.invitee.full_name.clone(),
        invite.role,
    );
    if !org.is_member(&member.id) {
        org.members.push(member.clone());
    }
    debug!("{} joined organization {}", member.id, organization_id);
    Ok(member)
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// Open a two-person conversation, or return the one that already exists
/// between the same pair.
pub fn start_conversation(
    snap: &mut Snapshot,
    starter: MemberRef,
    target: MemberRef,
    organization_id: Option<&str>,
    ctx: &Ctx<'_>,
) -> Result<Conversation, StoreError> {
    if is_blank(&starter.id) || is_blank(&target.id) {
        return Err(StoreError::Validation("both participants need an id".into()));
    }
    if starter.id == target.id {
        return Err(StoreError::Validation(
            "cannot start a conversation with yourself".into(),
        ));
    }
    if let Some(existing) = snap
        .conversations
        .iter()
        .find(|c| c.is_between(&starter.id, &target.id))
    {
        debug!("reusing conversation {}", existing.id);
        return Ok(existing.clone());
    }
    if let Some(org_id) = organization_id
        && snap.organization(org_id).is_none()
    {
        return Err(StoreError::OrganizationNotFound(org_id.to_string()));
    }

    let conversation = Conversation {
        id: new_id(),
        organization_id: organization_id.map(str::to_string),
        participants: vec![starter, target],
        messages: Vec::new(),
        created_at: ctx.now,
    };
    debug!("started conversation {}", conversation.id);
    snap.conversations.push(conversation.clone());
    Ok(conversation)
}

/// Append a message. Blank text is a no-op returning `None`.
pub fn send_message(
    snap: &mut Snapshot,
    conversation_id: &str,
    sender: &MemberRef,
    text: &str,
    ctx: &Ctx<'_>,
) -> Result<Option<Message>, StoreError> {
    let conversation = snap
        .conversation_mut(conversation_id)
        .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))?;
    if !conversation.has_participant(&sender.id) {
        return Err(StoreError::Forbidden(format!(
            "{} is not part of conversation {}",
            sender.full_name, conversation_id
        )));
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let message = Message {
        id: new_id(),
        sender: sender.clone(),
        text: text.to_string(),
        sent_at: ctx.now,
    };
    conversation.messages.push(message.clone());
    debug!("message {} in conversation {}", message.id, conversation_id);
    Ok(Some(message))
}
