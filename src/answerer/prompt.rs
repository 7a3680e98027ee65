//! Prompts sent to the remote model.

use crate::models::Document;

/// System instruction restricting the model to the document's content.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that only pulls answers from the provided document text. If the answer is not present, respond with \"I do not know based on this document.\"";

const PROMPT_TEMPLATE: &str = r#"You are a helpful assistant answering questions about a document.

Rules:
- Only use information that comes from the document text.
- If the answer is not clearly in the document, say "I don't know based on this document."
- Be concise. Use bullet points when listing items.

Document:
{document}

Question:
{question}
"#;

/// Builds the user prompt embedding the full document text and the question.
pub fn build_grounding_prompt(doc: &Document, question: &str) -> String {
    // Single pass so a document containing "{question}" is not rewritten.
    let (head, tail) = PROMPT_TEMPLATE
        .split_once("{document}")
        .unwrap_or((PROMPT_TEMPLATE, ""));
    format!("{head}{}{}", doc.text, tail.replace("{question}", question))
}
