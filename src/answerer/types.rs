//! Types describing a produced answer.

use std::fmt;

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Generated by the remote chat-completion model.
    Remote,
    /// Built locally from keyword-matched snippets.
    Fallback,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Answer text together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    content: String,
    source: AnswerSource,
}

impl Answer {
    /// Creates an answer produced by the remote model.
    pub fn remote(content: String) -> Self {
        Self {
            content,
            source: AnswerSource::Remote,
        }
    }

    /// Creates an answer produced by the local fallback.
    pub fn fallback(content: String) -> Self {
        Self {
            content,
            source: AnswerSource::Fallback,
        }
    }

    /// Returns the answer text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns where the answer came from.
    pub fn source(&self) -> AnswerSource {
        self.source
    }

    /// Returns true if the local fallback produced this answer.
    pub fn is_fallback(&self) -> bool {
        self.source == AnswerSource::Fallback
    }

    /// Consumes the answer, returning its text.
    pub fn into_content(self) -> String {
        self.content
    }
}
