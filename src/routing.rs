//! Complexity-based query routing.
//!
//! The router scores a query against a fixed set of linguistic features and
//! picks the cheapest retrieval strategy expected to answer it. It never runs
//! retrieval itself.
//!
//! # Example
//!
//! ```
//! use modelseek::routing::{ComplexityRouter, Strategy};
//!
//! let router = ComplexityRouter::default();
//! assert_eq!(router.route("pytorch vision").strategy, Strategy::LexicalOnly);
//!
//! let decision = router.route("count models by task");
//! assert!(decision.complexity_score >= 0.3);
//! assert!(decision.matched_features.contains("aggregation"));
//! ```

pub mod config;
pub mod features;
pub mod router;
pub mod types;

pub use self::config::RouterConfig;
pub use self::features::{FeatureDetector, QueryFeature};
pub use self::router::ComplexityRouter;
pub use self::types::{RoutingDecision, Strategy};
