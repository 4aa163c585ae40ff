use chrono::{DateTime, Utc};

use crate::model::member::{Member, MemberRef};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::organization::{Invite, Organization};
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::Task;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Notifications caused by `actor` changing a task from `before` to `after`.
/// `before` is `None` for a newly created task.
pub fn task_change_notifications(
    project: &Project,
    before: Option<&Task>,
    after: &Task,
    actor: &MemberRef,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let mut out = Vec::new();

    if let Some(assignee) = &after.assigned_to {
        let newly_assigned = before
            .and_then(|b| b.assigned_to.as_ref())
            .is_none_or(|prev| prev.id != assignee.id);
        if newly_assigned && assignee.id != actor.id {
            out.push(build(
                &assignee.id,
                actor,
                NotificationKind::TaskAssigned,
                "Task assigned".to_string(),
                format!(
                    "{} assigned you \"{}\" in {}",
                    actor.full_name, after.title, project.name
                ),
                now,
            )
            .about_task(project, &after.id));
        }
    }

    if let Some(prev) = before
        && prev.status != after.status
        && let Some(assignee) = &after.assigned_to
        && assignee.id != actor.id
    {
        out.push(build(
            &assignee.id,
            actor,
            NotificationKind::TaskStatusChanged,
            "Task status changed".to_string(),
            format!(
                "{} moved \"{}\" to {}",
                actor.full_name,
                after.title,
                after.status.column().title()
            ),
            now,
        )
        .about_task(project, &after.id));
    }

    let new_comments = after
        .comments
        .iter()
        .filter(|c| before.is_none_or(|b| b.comment(&c.id).is_none()));
    for comment in new_comments {
        let mut recipients: Vec<&MemberRef> = Vec::new();
        if let Some(assignee) = &after.assigned_to {
            recipients.push(assignee);
        }
        if !recipients.iter().any(|r| r.id == after.created_by.id) {
            recipients.push(&after.created_by);
        }
        for recipient in recipients {
            if recipient.id == comment.commented_by.id {
                continue;
            }
            out.push(build(
                &recipient.id,
                &comment.commented_by,
                NotificationKind::TaskComment,
                "New comment".to_string(),
                format!(
                    "{} commented on \"{}\": {}",
                    comment.commented_by.full_name, after.title, comment.comment_text
                ),
                now,
            )
            .about_task(project, &after.id));
        }
    }

    out
}

/// Notification for a member being added to a project by `actor`
pub fn member_added_notification(
    project: &Project,
    member: &Member,
    actor: &MemberRef,
    now: DateTime<Utc>,
) -> Option<Notification> {
    if member.id == actor.id {
        return None;
    }
    let mut note = build(
        &member.id,
        actor,
        NotificationKind::ProjectInvite,
        "Added to project".to_string(),
        format!(
            "{} added you to {} as {}",
            actor.full_name, project.name, member.role
        ),
        now,
    );
    note.project_id = Some(project.id.clone());
    Some(note)
}

/// Notification telling the invitee about an open organization invite
pub fn organization_invite_notification(
    organization: &Organization,
    invite: &Invite,
    now: DateTime<Utc>,
) -> Option<Notification> {
    if invite.invitee.id == invite.invited_by.id {
        return None;
    }
    let mut note = build(
        &invite.invitee.id,
        &invite.invited_by,
        NotificationKind::OrganizationInvite,
        "Organization invite".to_string(),
        format!(
            "{} invited you to {} as {} (accept with invite {})",
            invite.invited_by.full_name, organization.name, invite.role, invite.id
        ),
        now,
    );
    note.organization_id = Some(organization.id.clone());
    Some(note)
}

fn build(
    recipient_id: &str,
    sender: &MemberRef,
    kind: NotificationKind,
    title: String,
    message: String,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id: uuid::Uuid::new_v4().to_string(),
        recipient_id: recipient_id.to_string(),
        sender: Some(sender.clone()),
        kind,
        title,
        message,
        project_id: None,
        organization_id: None,
        task_id: None,
        is_read: false,
        created_at: now,
    }
}

impl Notification {
    fn about_task(mut self, project: &Project, task_id: &str) -> Notification {
        self.project_id = Some(project.id.clone());
        self.task_id = Some(task_id.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Inbox operations
// ---------------------------------------------------------------------------

/// Notifications for one recipient, newest first
pub fn notifications_for<'a>(snapshot: &'a Snapshot, recipient_id: &str) -> Vec<&'a Notification> {
    let mut list: Vec<&Notification> = snapshot
        .notifications
        .iter()
        .filter(|n| n.recipient_id == recipient_id)
        .collect();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    list
}

pub fn unread_count(snapshot: &Snapshot, recipient_id: &str) -> usize {
    snapshot
        .notifications
        .iter()
        .filter(|n| n.recipient_id == recipient_id && !n.is_read)
        .count()
}

/// Returns false if no notification has this id
pub fn mark_read(snapshot: &mut Snapshot, notification_id: &str) -> bool {
    match snapshot
        .notifications
        .iter_mut()
        .find(|n| n.id == notification_id)
    {
        Some(n) => {
            n.is_read = true;
            true
        }
        None => false,
    }
}

/// Returns the number of notifications that changed
pub fn mark_all_read(snapshot: &mut Snapshot, recipient_id: &str) -> usize {
    let mut changed = 0;
    for n in snapshot
        .notifications
        .iter_mut()
        .filter(|n| n.recipient_id == recipient_id && !n.is_read)
    {
        n.is_read = true;
        changed += 1;
    }
    changed
}

pub fn dismiss(snapshot: &mut Snapshot, notification_id: &str) -> bool {
    let before = snapshot.notifications.len();
    snapshot.notifications.retain(|n| n.id != notification_id);
    snapshot.notifications.len() != before
}

pub(crate) fn drop_for_project(snapshot: &mut Snapshot, project_id: &str) {
    snapshot
        .notifications
        .retain(|n| n.project_id.as_deref() != Some(project_id));
}

pub(crate) fn drop_for_organization(snapshot: &mut Snapshot, organization_id: &str) {
    snapshot
        .notifications
        .retain(|n| n.organization_id.as_deref() != Some(organization_id));
}

pub(crate) fn drop_for_task(snapshot: &mut Snapshot, task_id: &str) {
    snapshot
        .notifications
        .retain(|n| n.task_id.as_deref() != Some(task_id));
}
