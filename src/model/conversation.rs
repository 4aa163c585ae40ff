use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: MemberRef,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// A direct conversation between members, optionally scoped to an
/// organization. Messages are kept in the order they were sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub participants: Vec<MemberRef>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, member_id: &str) -> bool {
        self.participants.iter().any(|p| p.id == member_id)
    }

    /// True for a two-person conversation between exactly `a` and `b`
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        self.participants.len() == 2 && self.has_participant(a) && self.has_participant(b)
    }

    /// Participants other than `member_id`
    pub fn others<'a>(&'a self, member_id: &'a str) -> impl Iterator<Item = &'a MemberRef> {
        self.participants.iter().filter(move |p| p.id != member_id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
