use polars::prelude::PolarsError;
use thiserror::Error;

use crate::provider::ProviderError;

/// Analysis pipeline errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No rows left to work with after filtering and joining
    #[error("{0}")]
    EmptyDataset(String),

    /// Feature and target tables disagree on row count
    #[error("Mismatch in number of samples: X has {features} samples, y has {targets} samples.")]
    LengthMismatch { features: usize, targets: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Table operation failed: {0}")]
    Data(#[from] PolarsError),
}

pub const EMPTY_DATASET_MESSAGE: &str = "Dataset is empty after preprocessing. Check data sources!";

/// Check a feature matrix / target vector pair before fitting
pub fn validate_training_shape(features: &[Vec<f64>], targets: &[f64]) -> Result<(), AnalysisError> {
    if features.len() != targets.len() {
        return Err(AnalysisError::LengthMismatch {
            features: features.len(),
            targets: targets.len(),
        });
    }
    if features.is_empty() {
        return Err(AnalysisError::EmptyDataset(EMPTY_DATASET_MESSAGE.to_string()));
    }
    let width = features[0].len();
    if let Some(row) = features.iter().position(|r| r.len() != width) {
        return Err(AnalysisError::InvalidInput(format!(
            "Feature row {} has {} columns, expected {}",
            row,
            features[row].len(),
            width
        )));
    }
    Ok(())
}

/// Lap and qualifying times must be finite and positive
pub fn validate_lap_time(seconds: f64) -> Result<(), AnalysisError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Lap time must be a positive number of seconds, got {}",
            seconds
        )));
    }
    Ok(())
}
