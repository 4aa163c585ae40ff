use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::Task;

/// Which field of a task matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Title,
    Description,
    Comment,
}

impl MatchField {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Title => "title",
            MatchField::Description => "description",
            MatchField::Comment => "comment",
        }
    }
}

/// A search hit for a task field
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub project_id: String,
    pub task_id: String,
    pub field: MatchField,
    /// Set when `field` is `Comment`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search tasks across the snapshot.
///
/// If `project_filter` is `Some`, only the project with that id is searched.
pub fn search_tasks(snapshot: &Snapshot, re: &Regex, project_filter: Option<&str>) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for project in &snapshot.projects {
        if project_filter.is_some_and(|id| id != project.id) {
            continue;
        }
        for task in &project.tasks {
            search_task(re, project, task, &mut hits);
        }
    }
    hits
}

fn search_task(re: &Regex, project: &Project, task: &Task, hits: &mut Vec<SearchHit>) {
    let mut push = |field: MatchField, comment_id: Option<&str>, text: &str| {
        let spans = find_matches(re, text);
        if !spans.is_empty() {
            hits.push(SearchHit {
                project_id: project.id.clone(),
                task_id: task.id.clone(),
                field,
                comment_id: comment_id.map(str::to_string),
                spans,
            });
        }
    };

    push(MatchField::Title, None, &task.title);
    push(MatchField::Description, None, &task.description);
    for comment in &task.comments {
        push(MatchField::Comment, Some(&comment.id), &comment.comment_text);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
