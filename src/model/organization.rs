use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::{Member, MemberRef, Role};
use super::project::OrganizationRef;

/// A pending or accepted invitation to join an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    pub invitee: MemberRef,
    pub role: Role,
    pub invited_by: MemberRef,
    #[serde(default)]
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// An organization groups projects and owns its own member roster.
///
/// Projects point at an organization through [`OrganizationRef`]; deleting
/// the organization deletes those projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub invites: Vec<Invite>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn is_member(&self, member_id: &str) -> bool {
        self.member(member_id).is_some()
    }

    pub fn invite(&self, invite_id: &str) -> Option<&Invite> {
        self.invites.iter().find(|i| i.id == invite_id)
    }

    /// The open invite addressed to `member_id`, if any
    pub fn pending_invite_for(&self, member_id: &str) -> Option<&Invite> {
        self.invites
            .iter()
            .find(|i| !i.accepted && i.invitee.id == member_id)
    }

    pub fn to_ref(&self) -> OrganizationRef {
        OrganizationRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Fields accepted when creating an organization
#[derive(Debug, Clone, Default)]
pub struct OrganizationInput {
    /// Generated when absent
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub members: Vec<Member>,
}

impl OrganizationInput {
    pub fn new(name: impl Into<String>) -> Self {
        OrganizationInput {
            name: name.into(),
            ..Default::default()
        }
    }
}
