//! Text extraction for uploaded files.
//!
//! Only plain text and PDF uploads are accepted. The kind is decided from the
//! declared MIME type before any bytes are parsed.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use thiserror::Error;

/// Errors raised while turning uploaded bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The PDF could not be parsed.
    #[error("Could not read text from that PDF: {0}")]
    Pdf(String),
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `text/plain`, decoded as UTF-8.
    PlainText,
    /// `application/pdf`, text extracted page by page.
    Pdf,
}

impl DocumentKind {
    /// Maps a MIME type to a supported kind.
    ///
    /// Parameters such as `; charset=utf-8` are ignored and matching is
    /// case-insensitive. Returns `None` for anything else.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("text/plain") {
            Some(Self::PlainText)
        } else if essence.eq_ignore_ascii_case("application/pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Guesses the kind from a file extension (`.txt` or `.pdf`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Returns the canonical MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime())
    }
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Extracts plain text from uploaded bytes.
///
/// Text files are decoded as UTF-8, replacing invalid sequences and dropping
/// a leading byte-order mark. A PDF that parses but yields no text (e.g. a
/// scanned image) is accepted with a warning; a PDF that fails to parse is an
/// error.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::PlainText => {
            let text = String::from_utf8_lossy(bytes);
            Ok(text
                .strip_prefix(BYTE_ORDER_MARK)
                .unwrap_or(text.as_ref())
                .to_string())
        }
        DocumentKind::Pdf => {
            let text = extract_pdf_text(bytes)?;
            if text.trim().is_empty() {
                tracing::warn!(
                    "No text extracted from PDF. It may be a scanned image or have unusual encoding."
                );
            }
            Ok(text)
        }
    }
}

/// Runs the PDF parser, turning its panics on malformed fonts or encodings
/// into ordinary extraction errors.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    })) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::warn!(reason, "PDF parser panicked");
            Err(ExtractionError::Pdf(reason))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "PDF parser panicked".to_string()
    }
}
