use super::role::Role;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from the model
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: String,
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user<S: Into<String>>(content: S) -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Message {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
