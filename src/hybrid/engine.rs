//! Search engine orchestrating routing, retrieval and fusion.
//!
//! The engine owns one immutable [`EngineSnapshot`] behind a lock that is
//! only held long enough to clone or replace an `Arc`. Searches work on the
//! snapshot they cloned, so a rebuild never blocks them and they never see a
//! half-built index.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::document::Document;
use crate::embedding::TextEmbedder;
use crate::error::Result;
use crate::hybrid::fusion::fuse;
use crate::hybrid::stats::{EngineCounters, SearchStats};
use crate::hybrid::types::{FusionResult, RetrievalSource, SearchResponse};
use crate::lexical::LexicalIndex;
use crate::routing::{ComplexityRouter, RoutingDecision, Strategy};
use crate::vector::DenseIndex;

/// The indexes one generation of the engine searches.
#[derive(Debug)]
pub struct EngineSnapshot {
    pub lexical: Arc<LexicalIndex>,
    pub dense: Option<Arc<DenseIndex>>,
}

/// Hybrid search engine.
///
/// # Examples
///
/// ```
/// use modelseek::config::EngineConfig;
/// use modelseek::document::{Document, FieldName};
/// use modelseek::hybrid::SearchEngine;
///
/// let docs = vec![
///     Document::builder("bert").add(FieldName::Title, "BERT base").build(),
///     Document::builder("vit").add(FieldName::Title, "ViT image model").build(),
/// ];
/// let engine = SearchEngine::build(&docs, EngineConfig::default(), None).unwrap();
///
/// let response = engine.search("bert", 5).unwrap();
/// assert_eq!(response.best().unwrap().doc_id.as_str(), "bert");
/// ```
#[derive(Debug)]
pub struct SearchEngine {
    config: EngineConfig,
    router: ComplexityRouter,
    state: RwLock<Arc<EngineSnapshot>>,
    counters: EngineCounters,
}

impl SearchEngine {
    /// Create an engine over already-built indexes.
    pub fn new(
        config: EngineConfig,
        lexical: LexicalIndex,
        dense: Option<DenseIndex>,
    ) -> Result<Self> {
        config.validate()?;
        let router = ComplexityRouter::new(config.router.clone())?;
        let snapshot = EngineSnapshot {
            lexical: Arc::new(lexical),
            dense: dense.map(Arc::new),
        };
        Ok(Self {
            config,
            router,
            state: RwLock::new(Arc::new(snapshot)),
            counters: EngineCounters::default(),
        })
    }

    /// Build the lexical index, and the dense index when an embedder is
    /// given, then create the engine.
    pub fn build(
        documents: &[Document],
        config: EngineConfig,
        embedder: Option<Arc<dyn TextEmbedder>>,
    ) -> Result<Self> {
        config.validate()?;
        let (lexical, dense) = Self::build_indexes(documents, &config, embedder)?;
        Self::new(config, lexical, dense)
    }

    fn build_indexes(
        documents: &[Document],
        config: &EngineConfig,
        embedder: Option<Arc<dyn TextEmbedder>>,
    ) -> Result<(LexicalIndex, Option<DenseIndex>)> {
        let lexical = LexicalIndex::build(documents, config.lexical.clone())?;
        let dense = match embedder {
            Some(embedder) => Some(DenseIndex::build(documents, embedder)?),
            None => None,
        };
        Ok((lexical, dense))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The indexes currently served.
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.state.read())
    }

    /// Rebuild every index from `documents` and swap them in.
    ///
    /// Building happens without holding the lock. On error the current
    /// indexes stay in place.
    pub fn rebuild(
        &self,
        documents: &[Document],
        embedder: Option<Arc<dyn TextEmbedder>>,
    ) -> Result<()> {
        let start = Instant::now();
        let (lexical, dense) = Self::build_indexes(documents, &self.config, embedder)?;
        self.replace(lexical, dense);
        info!(
            documents = documents.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rebuilt engine indexes"
        );
        Ok(())
    }

    /// Swap in new indexes.
    pub fn replace(&self, lexical: LexicalIndex, dense: Option<DenseIndex>) {
        let snapshot = Arc::new(EngineSnapshot {
            lexical: Arc::new(lexical),
            dense: dense.map(Arc::new),
        });
        *self.state.write() = snapshot;
        self.counters.record_rebuild();
    }

    /// Swap only the dense index, keeping the lexical one.
    pub fn set_dense(&self, dense: Option<DenseIndex>) {
        let mut state = self.state.write();
        let snapshot = Arc::new(EngineSnapshot {
            lexical: Arc::clone(&state.lexical),
            dense: dense.map(Arc::new),
        });
        *state = snapshot;
        drop(state);
        self.counters.record_rebuild();
    }

    /// Routing decision for `query` without running retrieval.
    pub fn route(&self, query: &str) -> RoutingDecision {
        self.router.route(query)
    }

    /// Route `query`, run the chosen strategy and return up to `top_k`
    /// results.
    pub fn search(&self, query: &str, top_k: usize) -> Result<SearchResponse> {
        let start = Instant::now();
        let decision = self.router.route(query);
        let snapshot = self.snapshot();

        let mut degraded = false;
        let mut deferred = false;
        let (executed, results) = match decision.strategy {
            Strategy::LexicalOnly => (Strategy::LexicalOnly, self.lexical(&snapshot, query, top_k)),
            Strategy::DenseFusion => match &snapshot.dense {
                Some(dense) => {
                    let pool = self.config.candidate_pool.max(top_k);
                    let lexical_hits = snapshot.lexical.search(query, pool);
                    let dense_hits = dense.search(query, pool)?;
                    debug!(
                        lexical = lexical_hits.len(),
                        dense = dense_hits.len(),
                        method = self.config.fusion.name(),
                        "Fusing candidates"
                    );
                    let fused = fuse(&lexical_hits, &dense_hits, self.config.fusion, top_k)?;
                    (Strategy::DenseFusion, fused)
                }
                None => {
                    warn!(query, "No dense index loaded, serving lexical results");
                    degraded = true;
                    (Strategy::LexicalOnly, self.lexical(&snapshot, query, top_k))
                }
            },
            Strategy::Defer => {
                deferred = true;
                if self.config.defer_fallback {
                    (Strategy::LexicalOnly, self.lexical(&snapshot, query, top_k))
                } else {
                    (Strategy::Defer, Vec::new())
                }
            }
        };

        self.counters
            .record_search(decision.strategy, degraded, &results);

        let query_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            query,
            routed = %decision.strategy,
            executed = %executed,
            results = results.len(),
            query_time_ms,
            "Search finished"
        );

        Ok(SearchResponse {
            query: query.to_string(),
            decision,
            executed,
            deferred,
            results,
            query_time_ms,
        })
    }

    fn lexical(&self, snapshot: &EngineSnapshot, query: &str, top_k: usize) -> Vec<FusionResult> {
        FusionResult::from_single_source(
            snapshot.lexical.search(query, top_k),
            RetrievalSource::Lexical,
        )
    }

    /// Counter snapshot.
    pub fn stats(&self) -> SearchStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldName;
    use crate::embedding::HashingEmbedder;
    use crate::hybrid::FusionMethod;

    fn corpus() -> Vec<Document> {
        vec![
            Document::builder("A")
                .add(FieldName::Title, "PyTorch BERT")
                .add(FieldName::Task, "nlp")
                .build(),
            Document::builder("B")
                .add(FieldName::Title, "TensorFlow ResNet")
                .add(FieldName::Task, "vision")
                .build(),
            Document::builder("C")
                .add(FieldName::Title, "PyTorch ResNet")
                .add(FieldName::Task, "vision")
                .build(),
        ]
    }

    fn embedder() -> Option<Arc<dyn TextEmbedder>> {
        Some(Arc::new(HashingEmbedder::new(64).unwrap()))
    }

    #[test]
    fn test_lexical_route() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), None).unwrap();
        let response = engine.search("pytorch vision", 3).unwrap();

        assert_eq!(response.decision.strategy, Strategy::LexicalOnly);
        assert_eq!(response.executed, Strategy::LexicalOnly);
        assert!(!response.deferred);
        assert_eq!(response.best().unwrap().doc_id.as_str(), "C");
        assert_eq!(response.results[0].lexical_rank, Some(1));
    }

    #[test]
    fn test_dense_fusion_route() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), embedder()).unwrap();
        let query = "pytorch models that handle vision and image tasks well";
        let response = engine.search(query, 3).unwrap();

        assert_eq!(response.decision.strategy, Strategy::DenseFusion);
        assert_eq!(response.executed, Strategy::DenseFusion);
        assert_eq!(response.len(), 3);
        assert!(response.results.iter().any(FusionResult::is_hybrid));
        assert_eq!(response.best().unwrap().doc_id.as_str(), "C");
    }

    #[test]
    fn test_dense_fusion_degrades_without_dense_index() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), None).unwrap();
        let query = "pytorch models that handle vision and image tasks well";
        let response = engine.search(query, 3).unwrap();

        assert_eq!(response.decision.strategy, Strategy::DenseFusion);
        assert_eq!(response.executed, Strategy::LexicalOnly);
        assert!(!response.is_empty());
        assert_eq!(engine.stats().degraded_routes, 1);
    }

    #[test]
    fn test_defer() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), None).unwrap();
        let response = engine.search("count pytorch models by task", 3).unwrap();
        assert_eq!(response.decision.strategy, Strategy::Defer);
        assert!(response.deferred);
        assert_eq!(response.executed, Strategy::LexicalOnly);
        assert!(!response.is_empty());

        let config = EngineConfig {
            defer_fallback: false,
            ..Default::default()
        };
        let engine = SearchEngine::build(&corpus(), config, None).unwrap();
        let response = engine.search("count pytorch models by task", 3).unwrap();
        assert!(response.deferred);
        assert_eq!(response.executed, Strategy::Defer);
        assert!(response.is_empty());
    }

    #[test]
    fn test_weighted_fusion_config() {
        let config = EngineConfig {
            fusion: FusionMethod::weighted(),
            ..Default::default()
        };
        let engine = SearchEngine::build(&corpus(), config, embedder()).unwrap();
        let response = engine
            .search("pytorch models that handle vision and image tasks well", 2)
            .unwrap();
        assert_eq!(response.len(), 2);
        assert!(response.results.iter().all(|r| r.combined_score <= 1.0 + 1e-12));
    }

    #[test]
    fn test_rebuild_swaps_indexes() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), None).unwrap();
        let before = engine.snapshot();

        let docs = vec![Document::builder("D").add(FieldName::Title, "Whisper").build()];
        engine.rebuild(&docs, None).unwrap();

        assert_eq!(before.lexical.len(), 3);
        assert_eq!(engine.snapshot().lexical.len(), 1);
        assert!(engine.search("pytorch", 5).unwrap().is_empty());
        assert_eq!(engine.search("whisper", 5).unwrap().len(), 1);
        assert_eq!(engine.stats().rebuilds, 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_current() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), None).unwrap();
        let err = engine.rebuild(&[], embedder());
        assert!(err.is_err());
        assert_eq!(engine.snapshot().lexical.len(), 3);
        assert_eq!(engine.stats().rebuilds, 0);
    }

    #[test]
    fn test_set_dense() {
        let engine = SearchEngine::build(&corpus(), EngineConfig::default(), None).unwrap();
        assert!(engine.snapshot().dense.is_none());
        let dense = DenseIndex::build(&corpus(), Arc::new(HashingEmbedder::new(32).unwrap()))
            .unwrap();
        engine.set_dense(Some(dense));
        assert_eq!(engine.snapshot().dense.as_ref().unwrap().len(), 3);
        assert_eq!(engine.snapshot().lexical.len(), 3);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = EngineConfig::default();
        config.router.low_threshold = 0.9;
        assert!(SearchEngine::build(&corpus(), config, None).is_err());
    }
}
