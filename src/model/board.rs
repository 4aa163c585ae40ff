use serde::{Deserialize, Serialize};

use super::task::TaskStatus;

/// A board column. Column ids (`todo`, `in-progress`, `done`) are a separate
/// namespace from [`TaskStatus`] names; every conversion between the two goes
/// through [`Column::status`] and [`Column::from_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

/// The one mapping table between column space and status space.
const COLUMN_STATUS: [(Column, TaskStatus); 3] = [
    (Column::Todo, TaskStatus::Todo),
    (Column::InProgress, TaskStatus::InProgress),
    (Column::Done, TaskStatus::Completed),
];

impl Column {
    /// Columns in board display order
    pub const ALL: [Column; 3] = [Column::Todo, Column::InProgress, Column::Done];

    pub fn id(self) -> &'static str {
        match self {
            Column::Todo => "todo",
            Column::InProgress => "in-progress",
            Column::Done => "done",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::InProgress => "In Progress",
            Column::Done => "Done",
        }
    }

    /// The task status a task in this column carries
    pub fn status(self) -> TaskStatus {
        COLUMN_STATUS
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, s)| *s)
            .unwrap_or(TaskStatus::Todo)
    }

    /// The column a task with this status is displayed in
    pub fn from_status(status: TaskStatus) -> Column {
        COLUMN_STATUS
            .iter()
            .find(|(_, s)| *s == status)
            .map(|(c, _)| *c)
            .unwrap_or(Column::Todo)
    }
}

impl TaskStatus {
    pub fn column(self) -> Column {
        Column::from_status(self)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Column {
    type Err = String;

    /// Accepts column ids and, for convenience, task status names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(c) = Column::ALL.into_iter().find(|c| c.id() == s) {
            return Ok(c);
        }
        COLUMN_STATUS
            .iter()
            .find(|(_, st)| st.as_str() == s)
            .map(|(c, _)| *c)
            .ok_or_else(|| format!("invalid column: {} (expected todo, in-progress, done)", s))
    }
}
