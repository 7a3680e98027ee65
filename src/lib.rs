pub mod answerer;
pub mod config;
pub mod extract;
pub mod models;
pub mod remote;
pub mod server;
pub mod service;
pub mod snippets;
pub mod store;

pub use answerer::{Answer, AnswerSource, DocumentAnswerer, build_fallback_answer};
pub use config::Config;
pub use models::{
    ChatMessage, ChatRole, Document, DocumentBuilder, DocumentId, DocumentSummary, MessageId,
};
pub use remote::{ChatClientTrait, ChatCompletionClient, ChatCompletionClientBuilder, RemoteError};
pub use service::{ServiceError, SidekickService};
pub use snippets::{select_relevant_snippets, truncate_snippet};
pub use store::DocumentStore;
