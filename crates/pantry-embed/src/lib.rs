//! pantry-embed
//!
//! A deterministic feature-hashing embedder. Words and their character
//! trigrams are hashed into a fixed number of buckets with a signed weight,
//! then the vector is L2-normalised. No model files, no network.
use std::hash::Hasher;
use tracing::debug;
use twox_hash::XxHash64;

use pantry_core::config::EmbeddingSettings;
use pantry_core::error::{Error, Result};
use pantry_core::traits::Embedder;

pub mod pool;
pub mod tokenize;

pub use pool::{dot, l2_normalize};

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.35;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidArgument("embedding dimension must be positive".into()));
        }
        Ok(Self { dim })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for word in tokenize::words(text) {
            self.add_feature(&mut v, &word, WORD_WEIGHT);
            for gram in tokenize::trigrams(&word) {
                self.add_feature(&mut v, &gram, TRIGRAM_WEIGHT);
            }
        }
        l2_normalize(&mut v);
        v
    }

    fn add_feature(&self, v: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(feature.as_bytes());
        let h = hasher.finish();
        let idx = (h % self.dim as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        v[idx] += sign * weight;
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(batch = texts.len(), dim = self.dim, "hash embedding batch");
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    Ok(Box::new(HashEmbedder::new(settings.dim)?))
}
