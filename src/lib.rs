//! # modelseek
//!
//! Multi-signal retrieval for catalogs of AI-model records.
//!
//! ## Features
//!
//! - BM25 lexical index with per-field weights, domain synonym expansion and
//!   structured-field boosting
//! - Dense embedding index with checksummed persistence
//! - Reciprocal Rank Fusion and weighted score fusion
//! - Complexity routing between lexical, fused and deferred strategies
//! - Atomic index swaps under concurrent readers
//!
//! ## Example
//!
//! ```
//! use modelseek::document::{Document, FieldName};
//! use modelseek::lexical::LexicalConfig;
//!
//! let docs = vec![
//!     Document::builder("A")
//!         .add(FieldName::Title, "PyTorch BERT")
//!         .add(FieldName::Task, "nlp")
//!         .build(),
//!     Document::builder("C")
//!         .add(FieldName::Title, "PyTorch ResNet")
//!         .add(FieldName::Task, "vision")
//!         .build(),
//! ];
//!
//! let index = modelseek::build_lexical(&docs, LexicalConfig::default()).unwrap();
//! let hits = modelseek::search_lexical(&index, "pytorch vision", 10);
//! assert_eq!(hits[0].doc_id.as_str(), "C");
//! assert_eq!(modelseek::statistics(&index).document_count, 2);
//! ```

use std::path::Path;
use std::sync::Arc;

pub mod analysis;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hybrid;
pub mod lexical;
pub mod routing;
pub mod storage;
pub mod vector;

pub use crate::hybrid::fuse;

use crate::document::Corpus;
use crate::embedding::TextEmbedder;
use crate::error::{ModelseekError, Result};
use crate::hybrid::RankedHit;
use crate::lexical::{IndexStatistics, LexicalConfig, LexicalIndex};
use crate::routing::{ComplexityRouter, RoutingDecision};
use crate::storage::file::FileStorage;
use crate::vector::DenseIndex;

/// Build a lexical index over every document in `corpus`.
pub fn build_lexical(corpus: &dyn Corpus, config: LexicalConfig) -> Result<LexicalIndex> {
    let documents = corpus.documents()?;
    LexicalIndex::build(&documents, config)
}

/// Top `top_k` lexical hits for `query`.
pub fn search_lexical(index: &LexicalIndex, query: &str, top_k: usize) -> Vec<RankedHit> {
    index.search(query, top_k)
}

/// Build a dense index over every document in `corpus`.
pub fn build_dense(corpus: &dyn Corpus, embedder: Arc<dyn TextEmbedder>) -> Result<DenseIndex> {
    let documents = corpus.documents()?;
    DenseIndex::build(&documents, embedder)
}

/// Load a dense index persisted in directory `path`.
pub fn load_dense<P: AsRef<Path>>(path: P, embedder: Arc<dyn TextEmbedder>) -> Result<DenseIndex> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(ModelseekError::storage(format!(
            "dense index directory not found: {}",
            path.display()
        )));
    }
    let storage = FileStorage::open(path)?;
    DenseIndex::load(&storage, embedder)
}

/// Top `top_k` dense hits for `query`.
pub fn search_dense(index: &DenseIndex, query: &str, top_k: usize) -> Result<Vec<RankedHit>> {
    index.search(query, top_k)
}

/// Route `query` with the default router configuration.
pub fn route(query: &str) -> RoutingDecision {
    ComplexityRouter::default().route(query)
}

/// Build statistics of a lexical index.
pub fn statistics(index: &LexicalIndex) -> &IndexStatistics {
    index.statistics()
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
