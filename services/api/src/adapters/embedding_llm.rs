//! services/api/src/adapters/embedding_llm.rs
//!
//! This module contains the adapter for the embedding model.
//! It implements the `EmbeddingService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use casebook_core::ports::{EmbeddingService, PortError, PortResult};
use tracing::debug;

/// Long case PDFs blow past the model's input limit; only the head is embedded.
///
/// The model caps input at 8,191 tokens and this budget counts characters.
/// Latin text runs about four characters per token, while CJK text can take
/// a token or more per character, so the budget stays below the token cap.
pub const MAX_EMBEDDING_INPUT_CHARS: usize = 8_000;

/// An adapter that implements `EmbeddingService` using the OpenAI embeddings endpoint.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Cuts `text` to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>> {
        let input = truncate_chars(text.trim(), MAX_EMBEDDING_INPUT_CHARS);
        if input.is_empty() {
            return Err(PortError::Upstream("Nothing to embed: input is empty".to_string()));
        }
        debug!(chars = input.chars().count(), model = %self.model, "Requesting embedding");

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(input.to_string())
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|embedding| embedding.embedding)
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| PortError::Upstream("Embedding response contained no vector.".to_string()))
    }
}
