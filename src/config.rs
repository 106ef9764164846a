//! Engine configuration.
//!
//! [`EngineConfig`] aggregates the lexical, fusion and routing settings.
//! Every struct fills missing JSON keys from its defaults, so a file only
//! needs the values it changes.
//!
//! # Examples
//!
//! ```
//! use modelseek::config::EngineConfig;
//! use modelseek::hybrid::FusionMethod;
//!
//! let config = EngineConfig::from_json(
//!     r#"{ "fusion": { "method": "weighted", "lexical": 0.7, "dense": 0.3 },
//!          "lexical": { "k1": 1.2 } }"#,
//! ).unwrap();
//! assert_eq!(config.lexical.k1, 1.2);
//! assert_eq!(config.lexical.b, 0.75);
//! assert_eq!(config.fusion, FusionMethod::Weighted { lexical: 0.7, dense: 0.3 });
//! assert_eq!(config.candidate_pool, 50);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::embedding::HashingEmbedder;
use crate::error::{ModelseekError, Result};
use crate::hybrid::FusionMethod;
use crate::lexical::LexicalConfig;
use crate::routing::RouterConfig;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lexical: LexicalConfig,
    pub fusion: FusionMethod,
    pub router: RouterConfig,
    /// Hits requested from each source before fusion.
    pub candidate_pool: usize,
    /// Attach lexical results to deferred responses.
    pub defer_fallback: bool,
    /// Dimension of the built-in hashing embedder.
    pub embedding_dimension: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lexical: LexicalConfig::default(),
            fusion: FusionMethod::default(),
            router: RouterConfig::default(),
            candidate_pool: 50,
            defer_fallback: true,
            embedding_dimension: HashingEmbedder::DEFAULT_DIMENSION,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| ModelseekError::invalid_config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ModelseekError::storage(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.lexical.validate()?;
        self.fusion.validate()?;
        self.router.validate()?;
        if self.candidate_pool == 0 {
            return Err(ModelseekError::invalid_config(
                "candidate_pool must be at least 1",
            ));
        }
        if self.embedding_dimension == 0 {
            return Err(ModelseekError::invalid_config(
                "embedding_dimension must be at least 1",
            ));
        }
        Ok(())
    }
}
