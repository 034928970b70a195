//! Embedding providers.
//!
//! The resolver only depends on the [`Embedder`] trait. Two providers ship with
//! the crate: the offline [`NgramEmbedder`] and the HTTP-backed
//! [`OpenAiEmbedder`] for OpenAI-compatible and Azure OpenAI endpoints.

pub mod ngram;
pub mod normalize;
pub mod openai;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::EmbeddingError;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

pub use ngram::NgramEmbedder;
pub use openai::OpenAiEmbedder;

/// Turns text into fixed-length vectors.
///
/// Implementations must be deterministic for identical input and model
/// version, otherwise directory scores drift between load and query time.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the model producing the vectors.
    fn model_id(&self) -> &str;

    /// Vector length, when known ahead of the first call.
    fn dimensions(&self) -> Option<usize>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, preserving order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Create the embedder selected by configuration.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.provider {
        EmbeddingProvider::Ngram => {
            info!("Using offline character-trigram embedder");
            if config.model != ngram::MODEL_ID {
                return Err(EmbeddingError::Config(format!(
                    "the ngram provider serves '{}', not '{}'",
                    ngram::MODEL_ID,
                    config.model
                )));
            }
            let dimensions = config.dimensions.unwrap_or(ngram::DEFAULT_DIMENSIONS);
            Ok(Arc::new(NgramEmbedder::new(dimensions)?))
        }
        EmbeddingProvider::OpenAi | EmbeddingProvider::Azure => {
            info!("Using {:?} embeddings with model '{}'", config.provider, config.model);
            Ok(Arc::new(OpenAiEmbedder::from_config(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        let embedder = NgramEmbedder::default();
        let batch = embedder.embed_batch(&["Ali Demir", "Selin Demir"]).await.unwrap();
        assert_eq!(batch[0], embedder.embed_text("Ali Demir"));
        assert_eq!(batch[1], embedder.embed_text("Selin Demir"));
    }

    #[test]
    fn test_factory_defaults_to_ngram() {
        let embedder = create_embedder(&EmbeddingConfig::default()).unwrap();
        assert_eq!(embedder.model_id(), ngram::MODEL_ID);
        assert_eq!(embedder.dimensions(), Some(ngram::DEFAULT_DIMENSIONS));
    }

    #[test]
    fn test_factory_rejects_foreign_model_for_ngram() {
        let config = EmbeddingConfig {
            model: "all-MiniLM-L6-v2".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(matches!(create_embedder(&config), Err(EmbeddingError::Config(_))));
    }
}
