//! Router configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelseekError, Result};
use crate::routing::features::QueryFeature;

/// Thresholds and feature weights for the [`ComplexityRouter`].
///
/// [`ComplexityRouter`]: crate::routing::ComplexityRouter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Scores below this route to lexical-only.
    pub low_threshold: f64,
    /// Scores at or above this defer to the generative pipeline.
    pub high_threshold: f64,
    /// Score contribution per detected feature.
    pub feature_weights: BTreeMap<QueryFeature, f64>,
    /// Token count from which a query counts as descriptive.
    pub descriptive_min_tokens: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            low_threshold: 0.3,
            high_threshold: 0.6,
            feature_weights: QueryFeature::ALL
                .iter()
                .map(|f| (*f, f.default_weight()))
                .collect(),
            descriptive_min_tokens: 6,
        }
    }
}

impl RouterConfig {
    /// Weight of a feature, falling back to its default.
    pub fn weight(&self, feature: QueryFeature) -> f64 {
        self.feature_weights
            .get(&feature)
            .copied()
            .unwrap_or_else(|| feature.default_weight())
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.low_threshold) || !in_unit(self.high_threshold) {
            return Err(ModelseekError::invalid_config(format!(
                "router thresholds must be in [0, 1], got low={} high={}",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.low_threshold > self.high_threshold {
            return Err(ModelseekError::invalid_config(format!(
                "low_threshold {} exceeds high_threshold {}",
                self.low_threshold, self.high_threshold
            )));
        }
        for (feature, weight) in &self.feature_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ModelseekError::invalid_config(format!(
                    "weight for feature '{feature}' must be non-negative, got {weight}"
                )));
            }
        }
        if self.descriptive_min_tokens == 0 {
            return Err(ModelseekError::invalid_config(
                "descriptive_min_tokens must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = RouterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weight(QueryFeature::Aggregation), 0.35);
    }

    #[test]
    fn test_threshold_validation() {
        let config = RouterConfig {
            low_threshold: 0.7,
            high_threshold: 0.6,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RouterConfig {
            high_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = RouterConfig::default();
        config.feature_weights.insert(QueryFeature::Negation, -0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: RouterConfig = serde_json::from_str(
            r#"{"high_threshold": 0.8, "feature_weights": {"aggregation": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(config.low_threshold, 0.3);
        assert_eq!(config.high_threshold, 0.8);
        assert_eq!(config.weight(QueryFeature::Aggregation), 0.5);
        assert_eq!(config.weight(QueryFeature::Grouping), 0.25);
    }
}
