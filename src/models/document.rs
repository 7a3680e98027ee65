use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::DocumentId;

/// An uploaded document and its extracted text.
///
/// Documents are created once on upload and never mutated afterwards. The
/// full text stays on the server; clients only ever see a [`DocumentSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier assigned on upload.
    pub id: DocumentId,
    /// Original file name as supplied by the uploader.
    pub name: String,
    /// Size of the uploaded file in bytes.
    pub size: u64,
    /// When the document was uploaded.
    pub uploaded_at: OffsetDateTime,
    /// Full extracted text.
    pub text: String,
}

impl Document {
    /// Returns the public metadata for this document, without its text.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Public view of a [`Document`] returned by the upload and list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub size: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

/// Builder for constructing `Document` instances with optional fields.
///
/// # Examples
///
/// ```
/// use sidekick::DocumentBuilder;
///
/// let doc = DocumentBuilder::new()
///     .name("notes.txt")
///     .text("Quarterly invoice total $500")
///     .build();
///
/// assert_eq!(doc.name, "notes.txt");
/// assert_eq!(doc.size, 28);
/// assert!(doc.id.as_str().starts_with("doc_"));
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    id: Option<DocumentId>,
    name: Option<String>,
    size: Option<u64>,
    uploaded_at: Option<OffsetDateTime>,
    text: Option<String>,
}

impl DocumentBuilder {
    /// Creates a new `DocumentBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document ID. A fresh one is generated when omitted.
    pub fn id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the file name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the upload size in bytes. Defaults to the text's byte length.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the upload timestamp.
    pub fn uploaded_at(mut self, uploaded_at: OffsetDateTime) -> Self {
        self.uploaded_at = Some(uploaded_at);
        self
    }

    /// Sets the extracted text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builds the `Document`, using defaults for optional fields.
    ///
    /// # Panics
    ///
    /// Panics if `name` has not been set.
    pub fn build(self) -> Document {
        let text = self.text.unwrap_or_default();
        Document {
            id: self.id.unwrap_or_else(DocumentId::generate),
            name: self.name.expect("name is required"),
            size: self.size.unwrap_or(text.len() as u64),
            uploaded_at: self.uploaded_at.unwrap_or_else(OffsetDateTime::now_utc),
            text,
        }
    }
}
