//! Ontology-enhanced BM25 lexical search.
//!
//! Documents are indexed per field: every posting remembers which field the
//! term came from so the field's weight can be applied at query time. Query
//! terms are expanded with domain synonyms before scoring, and documents
//! whose structured fields (task, library, framework) line up with the raw
//! query receive an additive boost on top of BM25.
//!
//! Indexes are immutable. A corpus change means building a new index.

// Configuration
pub mod config;

// Core data structures
pub mod index;
pub mod scoring;

// Query execution
pub mod search;

pub use config::{FieldWeights, LexicalConfig};
pub use index::{IndexStatistics, LexicalIndex, PostingEntry};
pub use search::ExplainedHit;
