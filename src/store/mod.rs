mod schema;

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::models::{Document, DocumentId, DocumentSummary};
use schema::INITIAL_SCHEMA;

/// Process-lifetime store of uploaded documents.
///
/// Backed by an in-memory SQLite connection: nothing survives a restart.
/// Each store instance is fully isolated, so tests construct their own and
/// call [`DocumentStore::clear`] (or simply drop it) on teardown.
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    /// Opens an empty in-memory store.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("document store lock poisoned"))
    }

    /// Stores a newly uploaded document.
    ///
    /// Documents are immutable: inserting an id that already exists fails.
    pub fn insert(&self, doc: &Document) -> Result<()> {
        let uploaded_at = doc
            .uploaded_at
            .format(&Rfc3339)
            .context("Failed to format upload timestamp")?;

        self.connection()?
            .execute(
                "INSERT INTO documents (id, name, size, uploaded_at, text) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    doc.id.as_str(),
                    doc.name,
                    doc.size as i64,
                    uploaded_at,
                    doc.text
                ],
            )
            .with_context(|| format!("Failed to store document {}", doc.id))?;

        Ok(())
    }

    /// Looks up a document by id.
    pub fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                "SELECT id, name, size, uploaded_at, text FROM documents WHERE id = ?1",
                [id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query document")?;

        let Some((id, name, size, uploaded_at, text)) = row else {
            return Ok(None);
        };

        Ok(Some(Document {
            id: DocumentId::new(id),
            name,
            size: size as u64,
            uploaded_at: parse_timestamp(&uploaded_at)?,
            text,
        }))
    }

    /// Lists metadata for every stored document in upload order.
    pub fn list(&self) -> Result<Vec<DocumentSummary>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT id, name, size, uploaded_at FROM documents ORDER BY rowid")
            .context("Failed to prepare document listing")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .context("Failed to list documents")?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, size, uploaded_at) = row.context("Failed to read document row")?;
            summaries.push(DocumentSummary {
                id: DocumentId::new(id),
                name,
                size: size as u64,
                uploaded_at: parse_timestamp(&uploaded_at)?,
            });
        }

        Ok(summaries)
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> Result<usize> {
        let count: i64 =
            self.connection()?
                .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Returns true when no documents have been uploaded.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Removes every document. Used on shutdown and test teardown.
    pub fn clear(&self) -> Result<()> {
        self.connection()?.execute("DELETE FROM documents", [])?;
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .with_context(|| format!("Invalid stored timestamp: {value}"))
}
