//! Scoring and regression

pub mod gbm;
pub mod metrics;
pub mod scoring;

// Re-export commonly used types
pub use gbm::{BoostingConfig, GradientBoostingRegressor};
pub use metrics::{mean_absolute_error, train_test_split, HoldoutSplit};
pub use scoring::{compare_sessions, score_map, wet_performance_score};
