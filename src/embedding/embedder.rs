//! Text embedding trait.

use crate::error::Result;
use crate::vector::Vector;

/// Trait for converting text to vector embeddings.
///
/// Calls may block (model inference, remote APIs). The engine only invokes
/// an embedder while building a dense index and once per dense query.
///
/// # Examples
///
/// ```
/// use modelseek::embedding::TextEmbedder;
/// use modelseek::error::Result;
/// use modelseek::vector::Vector;
///
/// struct ConstantEmbedder;
///
/// impl TextEmbedder for ConstantEmbedder {
///     fn embed(&self, _text: &str) -> Result<Vector> {
///         Ok(Vector::new(vec![1.0, 0.0]))
///     }
///
///     fn dimension(&self) -> usize {
///         2
///     }
///
///     fn model_identifier(&self) -> &str {
///         "constant-2"
///     }
/// }
///
/// let vector = ConstantEmbedder.embed("anything").unwrap();
/// assert_eq!(vector.dimension(), 2);
/// ```
pub trait TextEmbedder: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(&self, text: &str) -> Result<Vector>;

    /// Generate embeddings for multiple texts in batch.
    ///
    /// The default implementation calls `embed` sequentially.
    /// Override this method for better performance with batch processing.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Get the dimension of generated embeddings.
    fn dimension(&self) -> usize;

    /// Stable identifier of the model, recorded in persisted indexes.
    fn model_identifier(&self) -> &str;
}
