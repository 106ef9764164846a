//! Feature-hashing embedder.
//!
//! Tokens are hashed into a fixed number of buckets with FNV-1a and weighted
//! by term frequency. No model files, fully deterministic, and good enough to
//! exercise the dense path end to end.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::analysis::Tokenizer;
use crate::embedding::embedder::TextEmbedder;
use crate::error::{ModelseekError, Result};
use crate::vector::Vector;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    tokenizer: Tokenizer,
    identifier: String,
}

impl HashingEmbedder {
    /// Dimension used by the CLI.
    pub const DEFAULT_DIMENSION: usize = 256;

    /// Create an embedder producing `dimension`-wide vectors.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(ModelseekError::invalid_config(
                "embedding dimension must be positive",
            ));
        }
        Ok(Self {
            dimension,
            tokenizer: Tokenizer::default(),
            identifier: format!("hashing-{dimension}"),
        })
    }

    fn bucket(&self, term: &str) -> usize {
        let mut hash = FNV_OFFSET;
        for byte in term.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        (hash % self.dimension as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vector {
        let tokens = self.tokenizer.tokenize(text);
        let mut data = vec![0.0f32; self.dimension];
        if tokens.is_empty() {
            return Vector::new(data);
        }

        let mut frequencies: AHashMap<&str, f32> = AHashMap::new();
        for token in &tokens {
            *frequencies.entry(token.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in frequencies {
            // Longer terms are rarer on average; damp short ones.
            let weight = 1.0 + (term.len() as f32).ln();
            data[self.bucket(term)] += count / total * weight;
        }

        let mut vector = Vector::new(data);
        vector.normalize();
        vector
    }
}

impl TextEmbedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        Ok(texts.par_iter().map(|text| self.vectorize(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_identifier(&self) -> &str {
        &self.identifier
    }
}
