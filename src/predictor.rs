//! Race pace prediction from qualifying times
//!
//! A boosted regressor is fitted on the training rows of a holdout split,
//! scored on the held-out rows and then applied to every qualifying entry.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::gbm::{BoostingConfig, GradientBoostingRegressor};
use crate::core::metrics::{mean_absolute_error, train_test_split};
use crate::data::features::{PredictionInput, TrainingSet};
use crate::error::{validate_training_shape, AnalysisError};
use crate::models::PredictionRow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub boosting: BoostingConfig,
    /// Share of training rows held out for the MAE
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            boosting: BoostingConfig::default(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Ranked predictions plus holdout error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Fastest predicted race pace first
    pub rows: Vec<PredictionRow>,
    /// `None` when there were too few rows to hold any out
    pub mae: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_names: Vec<String>,
}

impl PredictionReport {
    pub fn winner(&self) -> Option<&PredictionRow> {
        self.rows.first()
    }
}

pub struct RacePredictor {
    config: PredictorConfig,
}

fn select(indices: &[usize], x: &[Vec<f64>], y: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
    indices.iter().map(|&i| (x[i].clone(), y[i])).unzip()
}

impl RacePredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Fit, evaluate and rank.
    pub fn run(
        &self,
        training: &TrainingSet,
        input: &PredictionInput,
    ) -> Result<PredictionReport, AnalysisError> {
        validate_training_shape(&training.features, &training.targets)?;
        if training.feature_names != input.feature_names {
            return Err(AnalysisError::InvalidInput(format!(
                "Training features {:?} do not match prediction features {:?}",
                training.feature_names, input.feature_names
            )));
        }
        if input.entries.len() != input.features.len() {
            return Err(AnalysisError::LengthMismatch {
                features: input.features.len(),
                targets: input.entries.len(),
            });
        }

        let split = train_test_split(training.len(), self.config.test_fraction, self.config.seed);
        let (x_train, y_train) = select(&split.train, &training.features, &training.targets);
        let (x_test, y_test) = select(&split.test, &training.features, &training.targets);

        info!(
            "Fitting on {} rows, holding out {} ({} features)",
            x_train.len(),
            x_test.len(),
            training.feature_names.len()
        );

        let mut model = GradientBoostingRegressor::new(self.config.boosting);
        model.fit(&x_train, &y_train)?;

        let mae = if x_test.is_empty() {
            None
        } else {
            mean_absolute_error(&y_test, &model.predict(&x_test)?)
        };
        match mae {
            Some(mae) => info!("Holdout MAE: {:.3} s", mae),
            None => info!("Too few rows for a holdout, MAE not computed"),
        }

        let predicted = model.predict(&input.features)?;
        let mut rows: Vec<PredictionRow> = input
            .entries
            .iter()
            .zip(&input.features)
            .zip(predicted)
            .map(|((entry, features), time)| PredictionRow {
                driver_name: entry.driver_name.clone(),
                driver_code: entry.driver_code.clone(),
                features: features.clone(),
                predicted_race_time_s: time,
            })
            .collect();

        // Stable: ties keep qualifying order
        rows.sort_by(|a, b| {
            a.predicted_race_time_s
                .partial_cmp(&b.predicted_race_time_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(PredictionReport {
            rows,
            mae,
            train_rows: x_train.len(),
            test_rows: x_test.len(),
            feature_names: training.feature_names.clone(),
        })
    }
}

impl Default for RacePredictor {
    fn default() -> Self {
        Self::new(PredictorConfig::default())
    }
}
