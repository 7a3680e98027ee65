use thiserror::Error;

use crate::answerer::DocumentAnswerer;
use crate::extract::{DocumentKind, ExtractionError, extract_text};
use crate::models::{ChatMessage, DocumentBuilder, DocumentId, DocumentSummary};
use crate::store::DocumentStore;

/// Errors returned by [`SidekickService`] operations.
///
/// Every variant is scoped to a single request. Remote model failures never
/// appear here: they are absorbed by the fallback answer path.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or invalid request fields.
    #[error("{0}")]
    Validation(String),

    /// Upload with a MIME type other than `text/plain` or `application/pdf`.
    #[error("Only .txt and .pdf files are supported for now.")]
    UnsupportedMediaType(String),

    /// No document with the requested id.
    #[error("Document not found.")]
    NotFound(DocumentId),

    /// The upload could not be turned into text; nothing was stored.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Store failures and other unexpected conditions.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    /// Returns true if the caller can fix the request and try again.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Service layer for uploading documents and asking questions about them.
///
/// Owns the document store and the answerer. UI-independent: the HTTP server
/// and the `ask` CLI command both go through it.
///
/// # Examples
///
/// ```
/// use sidekick::{DocumentStore, SidekickService};
/// use sidekick::answerer::DocumentAnswererBuilder;
///
/// # fn main() -> anyhow::Result<()> {
/// let service = SidekickService::new(
///     DocumentStore::in_memory()?,
///     DocumentAnswererBuilder::new().build(),
/// );
///
/// let summary = service.upload_document("notes.txt", "text/plain", b"Invoice total $500")?;
/// let reply = service.ask(summary.id.as_str(), "What is the invoice total?")?;
/// assert!(reply.content.contains("Invoice total $500"));
/// # Ok(())
/// # }
/// ```
pub struct SidekickService {
    store: DocumentStore,
    answerer: DocumentAnswerer,
}

impl SidekickService {
    /// Creates a new service from its collaborators.
    pub fn new(store: DocumentStore, answerer: DocumentAnswerer) -> Self {
        Self { store, answerer }
    }

    /// Returns a reference to the underlying document store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Extracts and stores an uploaded file.
    ///
    /// The MIME type is checked before any extraction is attempted. Returns
    /// the document's public metadata; the text itself is never echoed back.
    pub fn upload_document(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<DocumentSummary, ServiceError> {
        let kind = DocumentKind::from_mime(mime)
            .ok_or_else(|| ServiceError::UnsupportedMediaType(mime.to_string()))?;

        let text = extract_text(kind, bytes).inspect_err(|e| {
            tracing::error!(name, error = %e, "Unable to extract text from upload");
        })?;

        let doc = DocumentBuilder::new()
            .name(name)
            .size(bytes.len() as u64)
            .text(text)
            .build();
        self.store.insert(&doc)?;

        tracing::info!(document_id = %doc.id, name, size = doc.size, %kind, "Stored document");
        Ok(doc.summary())
    }

    /// Answers a question about a stored document.
    ///
    /// Both fields must be non-empty. The reply is always an assistant
    /// message, whether it came from the remote model or the fallback.
    pub fn ask(&self, document_id: &str, question: &str) -> Result<ChatMessage, ServiceError> {
        if document_id.is_empty() || question.is_empty() {
            return Err(ServiceError::Validation(
                "documentId and newMessage are required.".to_string(),
            ));
        }

        let id = DocumentId::new(document_id);
        let doc = self
            .store
            .get(&id)?
            .ok_or_else(|| ServiceError::NotFound(id))?;

        let answer = self.answerer.answer(&doc, question);
        tracing::info!(document_id = %doc.id, source = %answer.source(), "Answered question");

        Ok(ChatMessage::assistant(answer.into_content()))
    }

    /// Lists metadata for every uploaded document.
    pub fn list_documents(&self) -> Result<Vec<DocumentSummary>, ServiceError> {
        Ok(self.store.list()?)
    }
}
