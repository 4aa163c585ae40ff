use serde::{Deserialize, Serialize};

/// A member's role within a project or organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "Admin")]
    Admin,
    #[serde(alias = "Manager")]
    Manager,
    #[serde(alias = "Employee", alias = "member", alias = "Member")]
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Case-insensitive; `member` is accepted as a synonym for `employee`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" | "member" => Ok(Role::Employee),
            other => Err(format!(
                "invalid role: {} (expected admin, manager, employee)",
                other
            )),
        }
    }
}

/// Lightweight reference to a user, as embedded in tasks and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: String,
    pub full_name: String,
}

impl MemberRef {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        MemberRef {
            id: id.into(),
            full_name: full_name.into(),
        }
    }
}

/// A project member with a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub role: Role,
}

impl Member {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Member {
            id: id.into(),
            full_name: full_name.into(),
            role,
        }
    }

    pub fn to_ref(&self) -> MemberRef {
        MemberRef {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
        }
    }
}
