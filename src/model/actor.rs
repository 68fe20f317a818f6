use std::fmt;

use serde::{Deserialize, Serialize};

use super::work_item::WorkItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Editor,
    User,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::User => "user",
            Role::Other(s) => s,
        }
    }

    /// Privileged roles may move any ticket, not just their own.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "editor" => Role::Editor,
            "user" => Role::User,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user performing board operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
}

impl Actor {
    pub fn is_assignee(&self, item: &WorkItem) -> bool {
        match item.assigned_to.as_deref() {
            Some(assignee) => {
                assignee == self.id || self.name.as_deref().is_some_and(|n| n == assignee)
            }
            None => false,
        }
    }

    pub fn can_move(&self, item: &WorkItem) -> bool {
        self.role.is_privileged() || self.is_assignee(item)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.role),
            None => write!(f, "{} ({})", self.id, self.role),
        }
    }
}
