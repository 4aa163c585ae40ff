use serde::Serialize;

use crate::model::board::Column;
use crate::model::conversation::Conversation;
use crate::model::notification::Notification;
use crate::model::organization::Organization;
use crate::model::project::Project;
use crate::model::task::{Priority, Task};
use crate::ops::projection::ColumnProjection;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectSummaryJson {
    pub id: String,
    pub name: String,
    pub organization: String,
    pub members: usize,
    pub tasks: usize,
    pub done: usize,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub project_id: String,
    pub name: String,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub id: Column,
    pub title: &'static str,
    pub tasks: Vec<CardJson>,
}

/// A task as it appears on a board card
#[derive(Serialize)]
pub struct CardJson {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub comments: usize,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub project_id: String,
    pub task_id: String,
    pub title: String,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
}

#[derive(Serialize)]
pub struct OrganizationSummaryJson {
    pub id: String,
    pub name: String,
    pub members: usize,
    pub projects: usize,
    pub pending_invites: usize,
}

#[derive(Serialize)]
pub struct ConversationSummaryJson {
    pub id: String,
    pub with: Vec<String>,
    pub messages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

#[derive(Serialize)]
pub struct NotificationListJson<'a> {
    pub unread: usize,
    pub notifications: Vec<&'a Notification>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn project_summary(project: &Project) -> ProjectSummaryJson {
    ProjectSummaryJson {
        id: project.id.clone(),
        name: project.name.clone(),
        organization: project.organization.name.clone(),
        members: project.members.len(),
        tasks: project.tasks.len(),
        done: project
            .tasks
            .iter()
            .filter(|t| t.status.column() == Column::Done)
            .count(),
    }
}

pub fn organization_summary(org: &Organization, projects: usize) -> OrganizationSummaryJson {
    OrganizationSummaryJson {
        id: org.id.clone(),
        name: org.name.clone(),
        members: org.members.len(),
        projects,
        pending_invites: org.invites.iter().filter(|i| !i.accepted).count(),
    }
}

/// Summary of a conversation as seen by `viewer_id`
pub fn conversation_summary(conv: &Conversation, viewer_id: &str) -> ConversationSummaryJson {
    ConversationSummaryJson {
        id: conv.id.clone(),
        with: conv.others(viewer_id).map(|p| p.full_name.clone()).collect(),
        messages: conv.messages.len(),
        last_message: conv.last_message().map(|m| m.text.clone()),
    }
}

pub fn task_to_card(task: &Task) -> CardJson {
    CardJson {
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority,
        order: task.order,
        assignee: task.assigned_to.as_ref().map(|m| m.full_name.clone()),
        due_date: task.due_date.map(|d| d.to_string()),
        comments: task.comments.len(),
    }
}

pub fn board_to_json(project: &Project, columns: &ColumnProjection) -> BoardJson {
    BoardJson {
        project_id: project.id.clone(),
        name: project.name.clone(),
        columns: columns
            .iter()
            .map(|(column, ids)| ColumnJson {
                id: column,
                title: column.title(),
                tasks: ids
                    .iter()
                    .filter_map(|id| project.task(id))
                    .map(task_to_card)
                    .collect(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// First 8 characters of an id, enough to type back as a prefix
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!",
        Priority::Medium => "! ",
        Priority::Low => "  ",
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let assignee = task
        .assigned_to
        .as_ref()
        .map(|m| format!(" @{}", m.full_name))
        .unwrap_or_default();
    let due = task
        .due_date
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    format!(
        "{} {} {}{}{}",
        priority_marker(task.priority),
        short_id(&task.id),
        task.title,
        assignee,
        due
    )
}

/// Format the three columns of a board, one block per column
pub fn format_board(project: &Project, columns: &ColumnProjection) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", project.name, project.organization.name)];
    for (column, ids) in columns.iter() {
        lines.push(String::new());
        lines.push(format!("{} [{}]", column.title(), ids.len()));
        if ids.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for task in ids.iter().filter_map(|id| project.task(id)) {
            lines.push(format!("  {}", format_task_line(task)));
        }
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(project: &Project, task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", task.id, task.title),
        format!("project:  {}", project.name),
        format!("status:   {} ({})", task.status.column().title(), task.status),
        format!("priority: {}", task.priority),
    ];
    if let Some(assignee) = &task.assigned_to {
        lines.push(format!("assignee: {} ({})", assignee.full_name, assignee.id));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("due:      {}", due));
    }
    lines.push(format!("created:  {} by {}", task.created_at.format("%Y-%m-%d %H:%M"), task.created_by.full_name));
    lines.push(format!("updated:  {}", task.updated_at.format("%Y-%m-%d %H:%M")));

    if !task.description.is_empty() {
        lines.push(String::new());
        for l in task.description.lines() {
            lines.push(format!("  {}", l));
        }
    }

    if !task.comments.is_empty() {
        lines.push(String::new());
        lines.push(format!("comments ({}):", task.comments.len()));
        for c in &task.comments {
            lines.push(format!(
                "  [{}] {} {}: {}",
                short_id(&c.id),
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.commented_by.full_name,
                c.comment_text
            ));
        }
    }
    lines
}

pub fn format_project_detail(project: &Project) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", project.id, project.name),
        format!("organization: {} ({})", project.organization.name, project.organization.id),
        format!("created by:   {}", project.created_by.full_name),
    ];
    if !project.description.is_empty() {
        lines.push(format!("description:  {}", project.description));
    }
    lines.push(String::new());
    lines.push(format!("members ({}):", project.members.len()));
    for m in &project.members {
        lines.push(format!("  {} {} [{}]", m.id, m.full_name, m.role));
    }
    lines
}

pub fn format_organization_detail(org: &Organization, projects: &[&Project]) -> Vec<String> {
    let mut lines = vec![format!("{} {}", org.id, org.name)];
    if !org.description.is_empty() {
        lines.push(format!("description: {}", org.description));
    }
    lines.push(String::new());
    lines.push(format!("members ({}):", org.members.len()));
    for m in &org.members {
        lines.push(format!("  {} {} [{}]", m.id, m.full_name, m.role));
    }
    lines.push(String::new());
    lines.push(format!("projects ({}):", projects.len()));
    for p in projects {
        lines.push(format!("  {} {}", short_id(&p.id), p.name));
    }
    let pending: Vec<_> = org.invites.iter().filter(|i| !i.accepted).collect();
    if !pending.is_empty() {
        lines.push(String::new());
        lines.push(format!("open invites ({}):", pending.len()));
        for i in pending {
            lines.push(format!(
                "  {} {} ({}) as {}, from {}",
                short_id(&i.id),
                i.invitee.full_name,
                i.invitee.id,
                i.role,
                i.invited_by.full_name
            ));
        }
    }
    lines
}

pub fn format_conversation_line(conv: &Conversation, viewer_id: &str) -> String {
    let summary = conversation_summary(conv, viewer_id);
    let last = summary
        .last_message
        .map(|m| format!(": {}", m))
        .unwrap_or_default();
    format!(
        "{} with {} ({} messages){}",
        short_id(&conv.id),
        summary.with.join(", "),
        summary.messages,
        last
    )
}

pub fn format_conversation(conv: &Conversation, viewer_id: &str) -> Vec<String> {
    let mut lines = vec![format_conversation_line(conv, viewer_id)];
    if conv.messages.is_empty() {
        lines.push("  (no messages yet)".to_string());
    }
    for m in &conv.messages {
        lines.push(format!(
            "  {} {}: {}",
            m.sent_at.format("%Y-%m-%d %H:%M"),
            m.sender.full_name,
            m.text
        ));
    }
    lines
}

pub fn format_notification_line(n: &Notification) -> String {
    let marker = if n.is_read { " " } else { "*" };
    format!(
        "{} {} {} {}: {}",
        marker,
        short_id(&n.id),
        n.created_at.format("%Y-%m-%d %H:%M"),
        n.title,
        n.message
    )
}
