/// Schema for the in-memory document store.
///
/// `rowid` ordering doubles as upload order for listings.
pub const INITIAL_SCHEMA: &str = r#"
-- Documents table: one row per upload, never updated in place
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    size INTEGER NOT NULL,
    uploaded_at TEXT NOT NULL,
    text TEXT NOT NULL
);
"#;
