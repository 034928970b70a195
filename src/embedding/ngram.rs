//! Deterministic character-trigram embedding.
//!
//! Each name token contributes its boundary-padded character trigrams and a
//! whole-word feature. Features are hashed into a fixed number of buckets with
//! a sign bit and the result is L2-normalised, so identical names always map to
//! identical unit vectors and names sharing spelling fragments land close
//! together. It runs offline and needs no model files.

use super::normalize::name_tokens;
use super::Embedder;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Model identifier reported by [`NgramEmbedder`].
pub const MODEL_ID: &str = "char-trigram-sha256";

/// Default number of hash buckets.
pub const DEFAULT_DIMENSIONS: usize = 512;

#[derive(Debug, Clone)]
pub struct NgramEmbedder {
    dimensions: usize,
}

impl NgramEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, EmbeddingError> {
        if dimensions == 0 {
            return Err(EmbeddingError::Config("dimensions must be greater than zero".into()));
        }
        Ok(Self { dimensions })
    }

    /// Embed synchronously; the async trait method delegates here.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for feature in features(text) {
            let digest = Sha256::digest(feature.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let idx = (u64::from_le_bytes(bucket) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm = vector.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
        if norm > 0.0 {
            let inv = (1.0 / norm) as f32;
            for x in &mut vector {
                *x *= inv;
            }
        }
        vector
    }
}

impl Default for NgramEmbedder {
    fn default() -> Self {
        Self { dimensions: DEFAULT_DIMENSIONS }
    }
}

fn features(text: &str) -> Vec<String> {
    let mut features = Vec::new();
    for token in name_tokens(text) {
        let padded: Vec<char> =
            std::iter::once('^').chain(token.chars()).chain(std::iter::once('$')).collect();
        features.extend(padded.windows(3).map(|w| w.iter().collect::<String>()));
        features.push(format!("w:{}", token));
    }
    features
}

#[async_trait]
impl Embedder for NgramEmbedder {
    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_text(text))
    }
}
