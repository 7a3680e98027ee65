//! Remote-first answering with a local fallback.

use std::sync::Arc;

use crate::models::Document;
use crate::remote::{ChatClientTrait, NoopChatClient};

use super::fallback::build_fallback_answer;
use super::prompt::{SYSTEM_PROMPT, build_grounding_prompt};
use super::types::Answer;

/// Builder for constructing `DocumentAnswerer` instances.
#[derive(Default)]
pub struct DocumentAnswererBuilder {
    client: Option<Arc<dyn ChatClientTrait>>,
}

impl DocumentAnswererBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chat-completion client to use.
    pub fn client(mut self, client: Arc<dyn ChatClientTrait>) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the `DocumentAnswerer`.
    ///
    /// Without a client every question is answered by the local fallback.
    #[must_use]
    pub fn build(self) -> DocumentAnswerer {
        DocumentAnswerer {
            client: self.client.unwrap_or_else(|| Arc::new(NoopChatClient)),
        }
    }
}

/// Answers questions about a document, remote model first.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sidekick::DocumentBuilder;
/// use sidekick::answerer::DocumentAnswerer;
/// use sidekick::remote::NoopChatClient;
///
/// let answerer = DocumentAnswerer::new(Arc::new(NoopChatClient));
/// let doc = DocumentBuilder::new()
///     .name("invoice.txt")
///     .text("Invoice total $500\n\nDelivery address: 1 Main St")
///     .build();
///
/// let answer = answerer.answer(&doc, "What is the invoice total?");
/// assert!(answer.is_fallback());
/// assert!(answer.content().contains("Invoice total $500"));
/// ```
pub struct DocumentAnswerer {
    client: Arc<dyn ChatClientTrait>,
}

impl DocumentAnswerer {
    /// Creates a new `DocumentAnswerer` with the specified client.
    #[must_use]
    pub fn new(client: Arc<dyn ChatClientTrait>) -> Self {
        Self { client }
    }

    /// Answers `question` using only `doc`.
    ///
    /// Makes exactly one remote attempt. Any failure (missing token, error
    /// status, network trouble, timeout) is logged and answered locally, so
    /// this never fails.
    pub fn answer(&self, doc: &Document, question: &str) -> Answer {
        let prompt = build_grounding_prompt(doc, question);

        match self.client.complete(SYSTEM_PROMPT, &prompt) {
            Ok(content) => Answer::remote(content),
            Err(error) => {
                tracing::warn!(
                    document_id = %doc.id,
                    error = %error,
                    "Falling back to local summarizer"
                );
                Answer::fallback(build_fallback_answer(doc, question))
            }
        }
    }
}
