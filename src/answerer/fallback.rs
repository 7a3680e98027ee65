//! Local answer used when the remote model is unavailable.

use crate::models::Document;
use crate::snippets::select_relevant_snippets;

const BULLET: &str = "•";

/// Builds a snippet-based answer from the document alone.
///
/// Pure and infallible: a document with no text yields an apology naming
/// it, anything else yields an intro line followed by one bullet per
/// selected snippet.
pub fn build_fallback_answer(doc: &Document, question: &str) -> String {
    let text = doc.text.trim();
    if text.is_empty() {
        return format!(
            "I received your question about \"{}\", but I couldn't read any text from that upload yet.",
            doc.name
        );
    }

    let intro = format!(
        "I could not reach the language model, so here is a quick summary pulled directly from \"{}\":",
        doc.name
    );
    let bullets: Vec<String> = select_relevant_snippets(text, question)
        .into_iter()
        .map(|snippet| format!("{BULLET} {snippet}"))
        .collect();

    format!("{intro}\n{}", bullets.join("\n"))
}
