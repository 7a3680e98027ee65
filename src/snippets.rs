//! Keyword-based snippet selection for answering without a language model.
//!
//! The selector splits a document into paragraphs, keeps the ones sharing a
//! keyword with the question and returns the first few of them, truncated for
//! display. There is no ranking: a paragraph either matches or it does not,
//! and document order is preserved.

/// Maximum number of snippets returned by [`select_relevant_snippets`].
pub const MAX_SNIPPETS: usize = 3;

/// Maximum length of a snippet, in characters, after whitespace collapsing.
pub const MAX_SNIPPET_CHARS: usize = 280;

/// Marker appended to snippets cut at [`MAX_SNIPPET_CHARS`].
pub const ELLIPSIS: &str = "...";

/// Returned as the only snippet when a document has no non-blank lines.
pub const NO_PARSABLE_CONTENT: &str = "(Document contains text but no parsable sentences.)";

/// Question tokens shorter than this are ignored, which drops most stop-words.
const MIN_KEYWORD_CHARS: usize = 4;

/// Selects up to [`MAX_SNIPPETS`] paragraphs of `text` relevant to `question`.
///
/// A paragraph is relevant when its lower-cased form contains any question
/// keyword as a substring. When nothing matches (including when the question
/// has no usable keywords) the first paragraphs of the document are used
/// instead. The result is never empty.
///
/// # Examples
///
/// ```
/// use sidekick::snippets::select_relevant_snippets;
///
/// let text = "Invoice total $500\n\nDelivery address: 1 Main St";
/// let snippets = select_relevant_snippets(text, "What is the invoice total?");
/// assert_eq!(snippets, vec!["Invoice total $500"]);
/// ```
pub fn select_relevant_snippets(text: &str, question: &str) -> Vec<String> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        return vec![NO_PARSABLE_CONTENT.to_string()];
    }

    let keywords = extract_keywords(question);
    let relevant: Vec<&String> = paragraphs
        .iter()
        .filter(|paragraph| {
            let lower = paragraph.to_lowercase();
            keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
        })
        .collect();

    let selection: Vec<&String> = if relevant.is_empty() {
        paragraphs.iter().collect()
    } else {
        relevant
    };

    selection
        .into_iter()
        .take(MAX_SNIPPETS)
        .map(|paragraph| truncate_snippet(paragraph))
        .collect()
}

/// Splits text into trimmed, non-empty paragraphs.
///
/// Carriage returns are dropped first. Every newline is a boundary, so a
/// document with one sentence per line yields one paragraph per line.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace('\r', "");
    normalized
        .split('\n')
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(String::from)
        .collect()
}

/// Extracts lower-cased keywords of at least four characters from a question.
///
/// Tokens are separated by runs of anything that is not alphanumeric or `_`.
pub fn extract_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .map(String::from)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collapses whitespace runs to single spaces and caps the length.
///
/// Strings longer than [`MAX_SNIPPET_CHARS`] keep their first
/// `MAX_SNIPPET_CHARS - 3` characters followed by [`ELLIPSIS`], so the result
/// is exactly [`MAX_SNIPPET_CHARS`] characters long.
pub fn truncate_snippet(snippet: &str) -> String {
    let collapsed = collapse_whitespace(snippet);
    if collapsed.chars().count() <= MAX_SNIPPET_CHARS {
        return collapsed;
    }

    let keep = MAX_SNIPPET_CHARS - ELLIPSIS.chars().count();
    let mut truncated: String = collapsed.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_whitespace = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTAIN_DOC: &str = "The valley floor is green in spring.\n\n\
        The mountain rises 4,000 meters above sea level.\n\n\
        Visitors arrive mostly in summer.\n\
        The lake freezes in winter.";

    #[test]
    fn paragraphs_split_on_single_and_double_newlines() {
        let paragraphs = split_paragraphs("one\ntwo\n\n\nthree\r\n  four  \n\n");
        assert_eq!(paragraphs, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn carriage_returns_inside_lines_are_removed() {
        let paragraphs = split_paragraphs("ab\rcd");
        assert_eq!(paragraphs, vec!["abcd"]);
    }

    #[test]
    fn keywords_drop_short_words_and_punctuation() {
        let keywords = extract_keywords("What is the Mountain height?");
        assert_eq!(keywords, vec!["what", "mountain", "height"]);
    }

    #[test]
    fn keywords_keep_underscores_and_digits() {
        let keywords = extract_keywords("find order_id 12345, ok?");
        assert_eq!(keywords, vec!["find", "order_id", "12345"]);
    }

    #[test]
    fn paragraph_with_keyword_is_selected() {
        let snippets = select_relevant_snippets(MOUNTAIN_DOC, "What is the mountain height?");
        assert_eq!(
            snippets,
            vec!["The mountain rises 4,000 meters above sea level."]
        );
    }

    #[test]
    fn keyword_matches_inside_longer_words() {
        let text = "Unpaid invoices are listed below.\nShipping is free.";
        let snippets = select_relevant_snippets(text, "invoice");
        assert_eq!(snippets, vec!["Unpaid invoices are listed below."]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let text = "INVOICE TOTAL: $500\nsomething else";
        let snippets = select_relevant_snippets(text, "Invoice?");
        assert_eq!(snippets, vec!["INVOICE TOTAL: $500"]);
    }

    #[test]
    fn no_match_falls_back_to_first_three_paragraphs() {
        let snippets = select_relevant_snippets(MOUNTAIN_DOC, "Where is the harbour?");
        assert_eq!(
            snippets,
            vec![
                "The valley floor is green in spring.",
                "The mountain rises 4,000 meters above sea level.",
                "Visitors arrive mostly in summer.",
            ]
        );
    }

    #[test]
    fn short_word_question_behaves_like_empty_question() {
        let short = select_relevant_snippets(MOUNTAIN_DOC, "is it ok");
        let empty = select_relevant_snippets(MOUNTAIN_DOC, "");
        assert_eq!(short, empty);
        assert_eq!(short.len(), MAX_SNIPPETS);
    }

    #[test]
    fn at_most_three_relevant_paragraphs_in_document_order() {
        let text = "alpha report\nbeta\nreport two\nreport three\nreport four";
        let snippets = select_relevant_snippets(text, "report");
        assert_eq!(snippets, vec!["alpha report", "report two", "report three"]);
    }

    #[test]
    fn blank_only_text_returns_placeholder() {
        let snippets = select_relevant_snippets("\n\n  \r\n\t\n", "anything here");
        assert_eq!(snippets, vec![NO_PARSABLE_CONTENT.to_string()]);
    }

    #[test]
    fn selection_is_idempotent() {
        let first = select_relevant_snippets(MOUNTAIN_DOC, "summer visitors");
        let second = select_relevant_snippets(MOUNTAIN_DOC, "summer visitors");
        assert_eq!(first, second);
    }

    #[test]
    fn results_are_bounded_for_varied_inputs() {
        let long_line = "word ".repeat(200);
        let documents = [
            MOUNTAIN_DOC.to_string(),
            long_line.clone(),
            format!("{long_line}\n{long_line}\n{long_line}\n{long_line}"),
            "single".to_string(),
        ];
        let questions = ["", "word", "mountain height", "zzzz", "a b c"];

        for doc in &documents {
            for question in questions {
                let snippets = select_relevant_snippets(doc, question);
                assert!((1..=MAX_SNIPPETS).contains(&snippets.len()));
                for snippet in &snippets {
                    assert!(snippet.chars().count() <= MAX_SNIPPET_CHARS);
                }
            }
        }
    }

    #[test]
    fn truncate_collapses_whitespace() {
        assert_eq!(truncate_snippet("a  b\t\tc\n d"), "a b c d");
    }

    #[test]
    fn truncate_keeps_exactly_280_characters() {
        let input = "x".repeat(MAX_SNIPPET_CHARS);
        assert_eq!(truncate_snippet(&input), input);
    }

    #[test]
    fn truncate_cuts_281_characters_to_277_plus_ellipsis() {
        let input = "y".repeat(MAX_SNIPPET_CHARS + 1);
        let output = truncate_snippet(&input);

        assert_eq!(output.chars().count(), MAX_SNIPPET_CHARS);
        assert!(output.ends_with(ELLIPSIS));
        assert_eq!(&output[..277], "y".repeat(277));
    }

    #[test]
    fn truncate_measures_length_after_collapsing() {
        // over the limit raw, under it once the runs of spaces are collapsed
        let input = "ab   ".repeat(70);
        let output = truncate_snippet(input.trim_end());
        assert_eq!(output.chars().count(), 70 * 3 - 1);
        assert!(!output.ends_with(ELLIPSIS));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let input = "é".repeat(MAX_SNIPPET_CHARS);
        assert_eq!(truncate_snippet(&input), input);
    }
}
