//! The complexity router.

use tracing::debug;

use crate::error::Result;
use crate::routing::config::RouterConfig;
use crate::routing::features::FeatureDetector;
use crate::routing::types::{RoutingDecision, Strategy};

/// Stateless query classifier.
#[derive(Debug, Clone)]
pub struct ComplexityRouter {
    config: RouterConfig,
    detector: FeatureDetector,
}

impl Default for ComplexityRouter {
    fn default() -> Self {
        let config = RouterConfig::default();
        let detector = FeatureDetector::new(config.descriptive_min_tokens);
        Self { config, detector }
    }
}

impl ComplexityRouter {
    /// Create a router after validating `config`.
    pub fn new(config: RouterConfig) -> Result<Self> {
        config.validate()?;
        let detector = FeatureDetector::new(config.descriptive_min_tokens);
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Classify `query`.
    pub fn route(&self, query: &str) -> RoutingDecision {
        let features = self.detector.detect(query);
        let raw: f64 = features.keys().map(|f| self.config.weight(*f)).sum();
        let complexity_score = raw.clamp(0.0, 1.0);
        let strategy = self.strategy_for(complexity_score);

        debug!(
            query,
            complexity_score,
            strategy = %strategy,
            features = ?features,
            "Routed query"
        );

        RoutingDecision {
            strategy,
            complexity_score,
            matched_features: features.keys().map(|f| f.as_str().to_string()).collect(),
        }
    }

    /// Map a score onto a strategy using the configured thresholds.
    pub fn strategy_for(&self, complexity_score: f64) -> Strategy {
        if complexity_score >= self.config.high_threshold {
            Strategy::Defer
        } else if complexity_score >= self.config.low_threshold {
            Strategy::DenseFusion
        } else {
            Strategy::LexicalOnly
        }
    }
}
