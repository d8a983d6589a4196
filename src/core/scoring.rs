//! Wet Performance Scoring
//!
//! Relative pace of a driver in a wet session against a dry reference
//! session at the same venue:
//!     score = 1 + (t_ref - t_compare) / t_ref
//!
//! Where:
//!     t_ref     = mean lap time in the dry (reference) session
//!     t_compare = mean lap time in the wet session
//!
//! A score above 1.0 means the driver lost less time than the reference
//! pace would suggest. The same driver appearing identically in both
//! sessions scores exactly 1.0.

use std::collections::HashMap;

use crate::data::laps::compare_means;
use crate::error::{validate_lap_time, AnalysisError};
use crate::models::{DriverAggregate, WetPerformanceRow};

/// Score one driver
///
/// # Examples
/// ```
/// use f1_analytics::core::scoring::wet_performance_score;
/// let score = wet_performance_score(80.0, 88.0).unwrap();
/// assert!((score - 0.9).abs() < 1e-12);
/// ```
pub fn wet_performance_score(t_ref: f64, t_compare: f64) -> Result<f64, AnalysisError> {
    validate_lap_time(t_ref)?;
    validate_lap_time(t_compare)?;
    Ok(1.0 + (t_ref - t_compare) / t_ref)
}

/// Join wet and dry aggregates on driver and score every driver present in both.
///
/// Rows come back ordered by driver code.
pub fn compare_sessions(
    wet: &[DriverAggregate],
    dry: &[DriverAggregate],
) -> Result<Vec<WetPerformanceRow>, AnalysisError> {
    let pairs = compare_means(dry, wet)?;
    if pairs.is_empty() {
        return Err(AnalysisError::EmptyDataset(
            "No driver set a timed lap in both sessions".to_string(),
        ));
    }

    pairs
        .into_iter()
        .map(|pair| {
            let score = wet_performance_score(pair.reference_s, pair.compare_s)?;
            let difference_s = pair.reference_s - pair.compare_s;
            Ok(WetPerformanceRow {
                driver: pair.driver,
                wet_mean_s: pair.compare_s,
                dry_mean_s: pair.reference_s,
                difference_s,
                change_pct: difference_s / pair.reference_s * 100.0,
                score,
            })
        })
        .collect()
}

/// Driver code to score
pub fn score_map(rows: &[WetPerformanceRow]) -> HashMap<String, f64> {
    rows.iter().map(|r| (r.driver.clone(), r.score)).collect()
}
