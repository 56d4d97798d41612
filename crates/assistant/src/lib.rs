//! Chat-completion client for OpenRouter-compatible APIs.
//!
//! Thin wrapper: builds requests over configured defaults, maps upstream
//! HTTP statuses to a typed error taxonomy, and decodes SSE streams into
//! discrete content deltas. No retries are performed here; retry policy
//! belongs to the caller.

pub mod client;
pub mod error;
pub mod models;

pub use client::{ChatClient, ChatConfig, ChatStream};
pub use error::ChatError;
pub use models::{ChatMessage, ChatOptions, ChatResponse, MessageRole, StreamChunk, Usage};
