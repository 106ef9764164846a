//! Embedder backed by a table of pre-computed vectors.
//!
//! Useful when embeddings are produced out of process (a batch job running a
//! neural model) and only need to be looked up here. Text that was not
//! pre-computed fails with an embedding error rather than producing a
//! placeholder vector.

use std::collections::HashMap;

use crate::embedding::embedder::TextEmbedder;
use crate::error::{ModelseekError, Result};
use crate::vector::Vector;

/// Text-to-vector lookup table.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbedder {
    identifier: String,
    dimension: usize,
    vectors: HashMap<String, Vector>,
}

impl PrecomputedEmbedder {
    /// Create an empty table for a model.
    pub fn new<S: Into<String>>(identifier: S, dimension: usize) -> Self {
        Self {
            identifier: identifier.into(),
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Register the vector for a text.
    pub fn insert<S: Into<String>>(&mut self, text: S, vector: Vector) -> Result<()> {
        vector.validate_dimension(self.dimension)?;
        self.vectors.insert(text.into(), vector);
        Ok(())
    }

    /// Builder-style [`PrecomputedEmbedder::insert`].
    pub fn with<S: Into<String>>(mut self, text: S, data: Vec<f32>) -> Result<Self> {
        self.insert(text, Vector::new(data))?;
        Ok(self)
    }

    /// Number of registered texts.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether no text is registered.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl TextEmbedder for PrecomputedEmbedder {
    fn embed(&self, text: &str) -> Result<Vector> {
        self.vectors.get(text).cloned().ok_or_else(|| {
            ModelseekError::embedding(format!("no pre-computed vector for text '{text}'"))
        })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_identifier(&self) -> &str {
        &self.identifier
    }
}
