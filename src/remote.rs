/// Chat-completion HTTP client module.
///
/// This module provides a blocking client for OpenAI-style chat-completion
/// endpoints (Hugging Face router by default), its error type, and the
/// `ChatClientTrait` seam used to swap in mocks or an offline client.
mod client;

pub use client::{
    ChatClientTrait, ChatCompletionClient, ChatCompletionClientBuilder, DEFAULT_ENDPOINT,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT, NoopChatClient, RemoteError,
    extract_completion,
};
