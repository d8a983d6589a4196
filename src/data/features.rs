//! Feature tables for the lap-time predictor
//!
//! Qualifying entries are joined with historical per-driver lap data on the
//! driver code. Training rows need a match on both sides; prediction rows
//! keep every qualifying entry. Missing predictors are filled with zero.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::laps::{aggregate_frame, lap_frame, DRIVER, LAP_NUMBER, LAP_TIME, MEAN_LAP_TIME, SECTOR_COLUMNS};
use crate::error::AnalysisError;
use crate::models::{DriverAggregate, LapRecord, QualifyingEntry, WetPerformanceRow};

pub const QUALIFYING_TIME: &str = "qualifying_time_s";
pub const WET_SCORE: &str = "wet_score";
const DRIVER_NAME: &str = "driver_name";
const SLOT: &str = "slot";

/// Which predictors go into the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Mean sector 1-3 times from the historical session
    pub sectors: bool,
    /// Wet-performance score
    pub wet_score: bool,
}

impl FeatureSet {
    pub fn qualifying_only() -> Self {
        Self::default()
    }

    /// Column names in model order
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![QUALIFYING_TIME.to_string()];
        if self.sectors {
            names.extend(SECTOR_COLUMNS.iter().map(|s| s.to_string()));
        }
        if self.wet_score {
            names.push(WET_SCORE.to_string());
        }
        names
    }
}

/// One training row per driver (mean lap time) or per lap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    #[default]
    DriverMean,
    Lap,
}

/// Features and targets aligned by row
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub drivers: Vec<String>,
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Qualifying entries with the features the model will see
#[derive(Debug, Clone, Default)]
pub struct PredictionInput {
    pub entries: Vec<QualifyingEntry>,
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
}

fn qualifying_frame(qualifying: &[QualifyingEntry]) -> PolarsResult<DataFrame> {
    let slots: Vec<u32> = (0..qualifying.len() as u32).collect();
    let names: Vec<&str> = qualifying.iter().map(|q| q.driver_name.as_str()).collect();
    let codes: Vec<&str> = qualifying.iter().map(|q| q.driver_code.as_str()).collect();
    let times: Vec<f64> = qualifying.iter().map(|q| q.qualifying_time_s).collect();

    df!(
        SLOT => slots,
        DRIVER_NAME => names,
        DRIVER => codes,
        QUALIFYING_TIME => times
    )
}

fn wet_frame(scores: &[WetPerformanceRow]) -> PolarsResult<DataFrame> {
    let codes: Vec<&str> = scores.iter().map(|s| s.driver.as_str()).collect();
    let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
    df!(DRIVER => codes, WET_SCORE => values)
}

fn sector_frame(aggregates: &[DriverAggregate]) -> PolarsResult<LazyFrame> {
    Ok(aggregate_frame(aggregates)?.lazy().select([
        col(DRIVER),
        col(SECTOR_COLUMNS[0]),
        col(SECTOR_COLUMNS[1]),
        col(SECTOR_COLUMNS[2]),
    ]))
}

/// Left-join the optional predictors and fill their gaps with zero
fn attach_predictors(
    frame: LazyFrame,
    aggregates: &[DriverAggregate],
    wet_scores: &[WetPerformanceRow],
    features: FeatureSet,
    sectors_joined: bool,
) -> PolarsResult<LazyFrame> {
    let mut frame = frame;
    let left = || JoinArgs::new(JoinType::Left);

    if features.sectors && !sectors_joined {
        frame = frame.join(sector_frame(aggregates)?, [col(DRIVER)], [col(DRIVER)], left());
    }
    if features.wet_score {
        frame = frame.join(wet_frame(wet_scores)?.lazy(), [col(DRIVER)], [col(DRIVER)], left());
    }

    let fills: Vec<Expr> = features
        .names()
        .iter()
        .map(|name| col(name.as_str()).fill_null(lit(0.0)))
        .collect();

    Ok(frame.with_columns(fills))
}

fn extract_rows(df: &DataFrame, names: &[String]) -> PolarsResult<Vec<Vec<f64>>> {
    let mut rows = vec![Vec::with_capacity(names.len()); df.height()];
    for name in names {
        let column = df.column(name)?.f64()?;
        for (i, row) in rows.iter_mut().enumerate() {
            row.push(column.get(i).unwrap_or(0.0));
        }
    }
    Ok(rows)
}

/// Join qualifying times with historical laps into training rows.
///
/// With [`Granularity::DriverMean`] the target is each driver's mean lap
/// time; with [`Granularity::Lap`] every timed lap is a row.
pub fn build_training_set(
    qualifying: &[QualifyingEntry],
    laps: &[LapRecord],
    aggregates: &[DriverAggregate],
    wet_scores: &[WetPerformanceRow],
    features: FeatureSet,
    granularity: Granularity,
) -> Result<TrainingSet, AnalysisError> {
    let inner = JoinArgs::new(JoinType::Inner);
    let quali = qualifying_frame(qualifying)?.lazy();

    let (joined, target, sort_by) = match granularity {
        Granularity::DriverMean => {
            let history = aggregate_frame(aggregates)?.lazy();
            let joined = quali.join(history, [col(DRIVER)], [col(DRIVER)], inner);
            (
                attach_predictors(joined, aggregates, wet_scores, features, true)?,
                MEAN_LAP_TIME,
                vec![SLOT],
            )
        }
        Granularity::Lap => {
            let history = lap_frame(laps)?
                .lazy()
                .filter(col(LAP_TIME).is_not_null())
                .select([col(DRIVER), col(LAP_NUMBER), col(LAP_TIME)]);
            let joined = quali.join(history, [col(DRIVER)], [col(DRIVER)], inner);
            (
                attach_predictors(joined, aggregates, wet_scores, features, false)?,
                LAP_TIME,
                vec![SLOT, LAP_NUMBER],
            )
        }
    };

    let df = joined.sort(sort_by, SortMultipleOptions::default()).collect()?;

    let names = features.names();
    let rows = extract_rows(&df, &names)?;
    let target_col = df.column(target)?.f64()?;
    let driver_col = df.column(DRIVER)?.str()?;

    let mut set = TrainingSet {
        feature_names: names,
        ..Default::default()
    };
    for (i, row) in rows.into_iter().enumerate() {
        if let (Some(driver), Some(y)) = (driver_col.get(i), target_col.get(i)) {
            set.drivers.push(driver.to_string());
            set.features.push(row);
            set.targets.push(y);
        }
    }

    tracing::info!(
        "Training set: {} rows from {} qualifying entries",
        set.len(),
        qualifying.len()
    );

    Ok(set)
}

/// Features for every qualifying entry, in qualifying order
pub fn build_prediction_input(
    qualifying: &[QualifyingEntry],
    aggregates: &[DriverAggregate],
    wet_scores: &[WetPerformanceRow],
    features: FeatureSet,
) -> Result<PredictionInput, AnalysisError> {
    let quali = qualifying_frame(qualifying)?.lazy();
    let df = attach_predictors(quali, aggregates, wet_scores, features, false)?
        .sort([SLOT], SortMultipleOptions::default())
        .collect()?;

    let names = features.names();
    let rows = extract_rows(&df, &names)?;

    Ok(PredictionInput {
        entries: qualifying.to_vec(),
        feature_names: names,
        features: rows,
    })
}
