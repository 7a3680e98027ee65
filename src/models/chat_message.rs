use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use super::MessageId;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Message typed by the person asking questions.
    User,
    /// Answer produced by the remote model or the local fallback.
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn of a conversation about a document.
///
/// Messages are never stored server-side; they are built per request and
/// handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Reserved for provenance data; always empty for now.
    #[serde(default)]
    pub citations: Vec<String>,
}

impl ChatMessage {
    /// Creates an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role: ChatRole::Assistant,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
            citations: Vec::new(),
        }
    }
}
