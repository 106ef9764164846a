//! Dense (embedding-based) retrieval.
//!
//! # Module Structure
//!
//! - `core`: the [`Vector`] type
//! - `ann`: nearest-neighbour primitive traits and the exact flat backend
//! - `dense`: the [`DenseIndex`] lifecycle (build, persist, load, search)

pub mod ann;
pub mod core;
pub mod dense;

pub use self::ann::{AnnBuilder, AnnIndex, FlatAnn, FlatAnnBuilder};
pub use self::core::vector::Vector;
pub use self::dense::{DenseIndex, DenseManifest, DenseStatistics, document_text};
