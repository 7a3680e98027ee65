//! Answering questions about a single document.
//!
//! `DocumentAnswerer` asks the remote chat-completion model first and, when
//! that fails for any reason, builds a keyword-snippet answer locally so the
//! caller always gets text back.

mod document_answerer;
mod fallback;
mod prompt;
mod types;

pub use document_answerer::{DocumentAnswerer, DocumentAnswererBuilder};
pub use fallback::build_fallback_answer;
pub use prompt::{SYSTEM_PROMPT, build_grounding_prompt};
pub use types::{Answer, AnswerSource};
