//! The LLM request schema.
//!
//! The generateContent API takes an ordered `contents` array where each
//! entry is `{"role": "user"|"model", "parts": [{"text": ...}]}`. Stored
//! turns map onto this shape: our `user` role stays `"user"`, anything else
//! becomes `"model"`.

use crate::turn::Role;
use serde::{Deserialize, Serialize};

/// Role on the wire — distinct from the stored [`Role`], which uses `bot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Model,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => WireRole::User,
            _ => WireRole::Model,
        }
    }
}

/// A single text fragment of a content entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One entry in the `contents` array sent to the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: WireRole,
    pub parts: Vec<Part>,
}

impl Content {
    /// A content entry carrying its text as a single part.
    pub fn text(role: WireRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}
