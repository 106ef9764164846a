//! Text embedding support for dense retrieval.
//!
//! The engine treats the embedding model as an external collaborator behind
//! the [`TextEmbedder`] trait. Two implementations ship with the crate:
//!
//! - [`HashingEmbedder`]: deterministic feature hashing, no model files, used
//!   by the CLI and whenever no neural model is wired in
//! - [`PrecomputedEmbedder`]: a fixed text-to-vector table, for callers that
//!   embed out of process
//!
//! Every embedder reports a model identifier. Persisted dense indexes are
//! stamped with it and refuse to load under a different one.

pub mod embedder;
pub mod hashing;
pub mod precomputed;

pub use embedder::TextEmbedder;
pub use hashing::HashingEmbedder;
pub use precomputed::PrecomputedEmbedder;
