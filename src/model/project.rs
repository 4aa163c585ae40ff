use serde::{Deserialize, Serialize};

use super::member::{Member, MemberRef};
use super::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub id: String,
    pub name: String,
}

/// A project owns its members and tasks by value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub organization: OrganizationRef,
    pub created_by: MemberRef,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn is_member(&self, member_id: &str) -> bool {
        self.member(member_id).is_some()
    }
}

/// Fields accepted when creating a project
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub name: String,
    pub description: String,
    pub organization_id: String,
    pub organization_name: Option<String>,
    pub created_by: Option<MemberRef>,
    pub members: Vec<Member>,
    pub tasks: Vec<Task>,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>, organization_id: impl Into<String>) -> Self {
        ProjectInput {
            name: name.into(),
            organization_id: organization_id.into(),
            ..Default::default()
        }
    }
}
