mod chat_message;
mod document;
mod ids;

pub use chat_message::{ChatMessage, ChatRole};
pub use document::{Document, DocumentBuilder, DocumentSummary};
pub use ids::{DocumentId, MessageId};
