use serde::{Deserialize, Serialize};

use super::conversation::Conversation;
use super::notification::Notification;
use super::organization::Organization;
use super::project::Project;
use super::task::Task;

/// The complete state of a board session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

impl Snapshot {
    pub fn organization(&self, organization_id: &str) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == organization_id)
    }

    pub fn organization_mut(&mut self, organization_id: &str) -> Option<&mut Organization> {
        self.organizations.iter_mut().find(|o| o.id == organization_id)
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    pub fn conversation_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == conversation_id)
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    /// Find a task and the project that owns it
    pub fn find_task(&self, task_id: &str) -> Option<(&Project, &Task)> {
        self.projects
            .iter()
            .find_map(|p| p.task(task_id).map(|t| (p, t)))
    }

    /// Find the project owning a task, mutably
    pub fn task_owner_mut(&mut self, task_id: &str) -> Option<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.tasks.iter().any(|t| t.id == task_id))
    }
}
