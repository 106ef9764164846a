//! Hybrid retrieval: result types, rank fusion and the search engine.
//!
//! # Module Structure
//!
//! - `types`: [`RankedHit`], [`FusionResult`] and [`SearchResponse`]
//! - `normalizer`: min-max score scaling used by weighted fusion
//! - `fusion`: [`FusionMethod`] and [`fuse`]
//! - `engine`: [`SearchEngine`], routing queries and swapping indexes
//! - `stats`: query counters
//!
//! # Example
//!
//! ```
//! use modelseek::hybrid::{FusionMethod, RankedHit, fuse};
//!
//! let lexical = vec![RankedHit::new("C", 7.1, 1), RankedHit::new("A", 3.2, 2)];
//! let dense = vec![RankedHit::new("A", 0.91, 1), RankedHit::new("B", 0.40, 2)];
//!
//! let fused = fuse(&lexical, &dense, FusionMethod::rrf(), 10).unwrap();
//! assert_eq!(fused[0].doc_id.as_str(), "A");
//! assert!(fused[0].is_hybrid());
//! ```

pub mod engine;
pub mod fusion;
pub mod normalizer;
pub mod stats;
pub mod types;

pub use self::engine::{EngineSnapshot, SearchEngine};
pub use self::fusion::{FusionMethod, fuse};
pub use self::stats::SearchStats;
pub use self::types::{FusionResult, RankedHit, RetrievalSource, SearchResponse};
