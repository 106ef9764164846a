//! Query statistics for the search engine.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::hybrid::types::{FusionResult, RetrievalSource};
use crate::routing::Strategy;

/// Point-in-time copy of the engine counters.
///
/// # Examples
///
/// ```
/// use modelseek::hybrid::stats::SearchStats;
///
/// let stats = SearchStats {
///     total_searches: 4,
///     both_contribution: 2,
///     ..Default::default()
/// };
/// assert_eq!(stats.both_contribution_rate(), 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Searches served.
    pub total_searches: u64,
    /// Searches routed to lexical-only.
    pub lexical_only_routes: u64,
    /// Searches routed to dense fusion.
    pub dense_fusion_routes: u64,
    /// Searches routed to the heavy pipeline.
    pub deferred_routes: u64,
    /// Dense-fusion routes served lexical-only for lack of a dense index.
    pub degraded_routes: u64,
    /// Returned results found by both sources.
    pub both_contribution: u64,
    /// Returned results found by the lexical source only.
    pub lexical_only_contribution: u64,
    /// Returned results found by the dense source only.
    pub dense_only_contribution: u64,
    /// Completed index swaps.
    pub rebuilds: u64,
}

impl SearchStats {
    fn rate(&self, count: u64) -> f64 {
        if self.total_searches == 0 {
            0.0
        } else {
            count as f64 / self.total_searches as f64
        }
    }

    /// Results found by both sources, per search.
    pub fn both_contribution_rate(&self) -> f64 {
        self.rate(self.both_contribution)
    }

    /// Lexical-only results per search.
    pub fn lexical_only_rate(&self) -> f64 {
        self.rate(self.lexical_only_contribution)
    }

    /// Dense-only results per search.
    pub fn dense_only_rate(&self) -> f64 {
        self.rate(self.dense_only_contribution)
    }
}

/// Lock-free counters updated by concurrent searches.
#[derive(Debug, Default)]
pub(crate) struct EngineCounters {
    total_searches: AtomicU64,
    lexical_only_routes: AtomicU64,
    dense_fusion_routes: AtomicU64,
    deferred_routes: AtomicU64,
    degraded_routes: AtomicU64,
    both_contribution: AtomicU64,
    lexical_only_contribution: AtomicU64,
    dense_only_contribution: AtomicU64,
    rebuilds: AtomicU64,
}

impl EngineCounters {
    pub(crate) fn record_search(&self, routed: Strategy, degraded: bool, results: &[FusionResult]) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
        let route = match routed {
            Strategy::LexicalOnly => &self.lexical_only_routes,
            Strategy::DenseFusion => &self.dense_fusion_routes,
            Strategy::Defer => &self.deferred_routes,
        };
        route.fetch_add(1, Ordering::Relaxed);
        if degraded {
            self.degraded_routes.fetch_add(1, Ordering::Relaxed);
        }

        for result in results {
            let counter = if result.is_hybrid() {
                &self.both_contribution
            } else if result.sources.contains(&RetrievalSource::Lexical) {
                &self.lexical_only_contribution
            } else {
                &self.dense_only_contribution
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SearchStats {
        SearchStats {
            total_searches: self.total_searches.load(Ordering::Relaxed),
            lexical_only_routes: self.lexical_only_routes.load(Ordering::Relaxed),
            dense_fusion_routes: self.dense_fusion_routes.load(Ordering::Relaxed),
            deferred_routes: self.deferred_routes.load(Ordering::Relaxed),
            degraded_routes: self.degraded_routes.load(Ordering::Relaxed),
            both_contribution: self.both_contribution.load(Ordering::Relaxed),
            lexical_only_contribution: self.lexical_only_contribution.load(Ordering::Relaxed),
            dense_only_contribution: self.dense_only_contribution.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
        }
    }
}
