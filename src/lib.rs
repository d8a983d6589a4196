//! F1 Analytics - session analysis on public timing data
//!
//! This library provides:
//! - Session loading from Ergast-compatible and OpenF1 APIs
//! - Lap aggregation, feature joins and the season points pivot
//! - Wet-performance scoring and gradient-boosted race pace prediction
//! - Terminal rendering: tables, points heatmap and track speed map
//!
//! # Example
//!
//! ```
//! use f1_analytics::core::scoring::wet_performance_score;
//! use f1_analytics::roster;
//!
//! let score = wet_performance_score(75.0, 90.0).unwrap();
//! assert!((score - 0.8).abs() < 1e-12);
//!
//! assert_eq!(roster::code_for("Charles Leclerc"), Some("LEC"));
//! ```

pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod predictor;
pub mod provider;
pub mod report;
pub mod roster;
pub mod session;

// Re-export commonly used types
pub use error::AnalysisError;
pub use models::{
    DriverAggregate, EventRef, LapRecord, PredictionRow, QualifyingEntry, ResultRow, SessionId,
    SessionKind, TelemetrySample, WetPerformanceRow,
};
pub use predictor::{PredictionReport, PredictorConfig, RacePredictor};
pub use provider::{ApiClient, ProviderConfig, ProviderError};
pub use session::{RoundResults, Session, SessionLoader};
