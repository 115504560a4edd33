//! Chat turn domain types.
//!
//! A [`ChatTurn`] is one message in a conversation: User asks → relay calls
//! the LLM → Bot answers. Turns are immutable once written — the store only
//! ever appends, never updates or deletes.

use serde::{Deserialize, Serialize};

/// The user id substituted when a request carries none.
pub const DEFAULT_USER: &str = "default_user";

/// Opaque identifier for a conversation partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self(DEFAULT_USER.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The generated reply
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "bot" => Ok(Role::Bot),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A single message in a conversation partition.
///
/// Within a partition, turns are totally ordered by `timestamp`
/// (milliseconds since epoch), which doubles as the sort-key component of
/// the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// The conversation partition this turn belongs to
    pub user_id: UserId,

    /// Milliseconds since epoch, assigned at write time
    pub timestamp: i64,

    /// Who sent this turn
    pub role: Role,

    /// The text content
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(user_id: UserId, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            user_id,
            timestamp,
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a bot turn.
    pub fn bot(user_id: UserId, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            user_id,
            timestamp,
            role: Role::Bot,
            content: content.into(),
        }
    }
}
