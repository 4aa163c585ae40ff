use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberRef;

/// Task status, as stored on the task itself.
///
/// The board displays tasks in columns whose ids differ from these names;
/// see [`crate::model::board::Column`] for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    /// Accepts status names and column ids alike (`in_progress` or `in-progress`,
    /// `completed` or `done`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TaskStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .or_else(|| {
                s.parse::<super::board::Column>()
                    .ok()
                    .map(|c| c.status())
            })
            .ok_or_else(|| {
                format!(
                    "invalid status: {} (expected todo, in_progress, completed)",
                    s
                )
            })
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!(
                "invalid priority: {} (expected low, medium, high)",
                other
            )),
        }
    }
}

/// A comment on a task. Owned by exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub comment_text: String,
    pub commented_by: MemberRef,
    pub created_at: DateTime<Utc>,
}

/// A task on a project board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<MemberRef>,
    pub created_by: MemberRef,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Position within the task's status column. Not unique across columns.
    #[serde(default)]
    pub order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Task {
    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn is_assigned_to(&self, member_id: &str) -> bool {
        self.assigned_to.as_ref().is_some_and(|m| m.id == member_id)
    }
}

/// Fields accepted when creating a task. Anything left `None` is synthesized.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<MemberRef>,
    pub created_by: Option<MemberRef>,
    pub due_date: Option<NaiveDate>,
    pub order: Option<u32>,
    pub comments: Vec<Comment>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        TaskInput {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_assignee(mut self, member: MemberRef) -> Self {
        self.assigned_to = Some(member);
        self
    }
}
