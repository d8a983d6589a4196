//! Lap tables and per-driver aggregation

use polars::prelude::*;

use crate::error::AnalysisError;
use crate::models::{DriverAggregate, LapRecord};

pub const DRIVER: &str = "driver";
pub const LAP_NUMBER: &str = "lap_number";
pub const LAP_TIME: &str = "lap_time_s";
pub const MEAN_LAP_TIME: &str = "mean_lap_s";
pub const SECTOR_COLUMNS: [&str; 3] = ["sector1_s", "sector2_s", "sector3_s"];
const LAP_COUNT: &str = "laps";

/// Missing and non-finite values both become null
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// One row per lap: driver, lap number, lap time and sector times in seconds
pub fn lap_frame(laps: &[LapRecord]) -> PolarsResult<DataFrame> {
    let drivers: Vec<&str> = laps.iter().map(|l| l.driver.as_str()).collect();
    let lap_numbers: Vec<u32> = laps.iter().map(|l| l.lap_number as u32).collect();
    let times: Vec<Option<f64>> = laps.iter().map(|l| finite(l.lap_time_secs())).collect();
    let sector = |idx: usize| -> Vec<Option<f64>> {
        laps.iter().map(|l| finite(l.sector_secs(idx))).collect()
    };

    df!(
        DRIVER => drivers,
        LAP_NUMBER => lap_numbers,
        LAP_TIME => times,
        SECTOR_COLUMNS[0] => sector(0),
        SECTOR_COLUMNS[1] => sector(1),
        SECTOR_COLUMNS[2] => sector(2)
    )
}

/// Group a lap frame by driver. Laps without a time are dropped first;
/// sector means skip missing sectors.
pub fn mean_frame(frame: DataFrame) -> PolarsResult<DataFrame> {
    frame
        .lazy()
        .filter(col(LAP_TIME).is_not_null())
        .group_by([col(DRIVER)])
        .agg([
            col(LAP_TIME).mean().alias(MEAN_LAP_TIME),
            col(SECTOR_COLUMNS[0]).mean(),
            col(SECTOR_COLUMNS[1]).mean(),
            col(SECTOR_COLUMNS[2]).mean(),
            col(LAP_TIME).count().alias(LAP_COUNT),
        ])
        .sort([DRIVER], SortMultipleOptions::default())
        .collect()
}

/// Mean lap and sector times per driver, ordered by driver code
pub fn mean_lap_times(laps: &[LapRecord]) -> Result<Vec<DriverAggregate>, AnalysisError> {
    let means = mean_frame(lap_frame(laps)?)?;
    let dropped = laps.iter().filter(|l| finite(l.lap_time_secs()).is_none()).count();
    if dropped > 0 {
        tracing::debug!("Dropped {} laps without a recorded time", dropped);
    }
    Ok(frame_to_aggregates(&means)?)
}

fn frame_to_aggregates(df: &DataFrame) -> PolarsResult<Vec<DriverAggregate>> {
    let driver_col = df.column(DRIVER)?.str()?;
    let mean_col = df.column(MEAN_LAP_TIME)?.f64()?;
    let s1_col = df.column(SECTOR_COLUMNS[0])?.f64()?;
    let s2_col = df.column(SECTOR_COLUMNS[1])?.f64()?;
    let s3_col = df.column(SECTOR_COLUMNS[2])?.f64()?;
    let count_col = df.column(LAP_COUNT)?.u32()?;

    let mut aggregates = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        if let (Some(driver), Some(mean)) = (driver_col.get(i), mean_col.get(i)) {
            aggregates.push(DriverAggregate {
                driver: driver.to_string(),
                mean_lap_s: mean,
                mean_sectors_s: [s1_col.get(i), s2_col.get(i), s3_col.get(i)],
                laps: count_col.get(i).unwrap_or(0) as usize,
            });
        }
    }
    Ok(aggregates)
}

/// Frame of per-driver aggregates: driver, mean lap time, sector means
pub fn aggregate_frame(aggregates: &[DriverAggregate]) -> PolarsResult<DataFrame> {
    let drivers: Vec<&str> = aggregates.iter().map(|a| a.driver.as_str()).collect();
    let means: Vec<f64> = aggregates.iter().map(|a| a.mean_lap_s).collect();
    let sector = |idx: usize| -> Vec<Option<f64>> {
        aggregates.iter().map(|a| a.mean_sectors_s[idx]).collect()
    };

    df!(
        DRIVER => drivers,
        MEAN_LAP_TIME => means,
        SECTOR_COLUMNS[0] => sector(0),
        SECTOR_COLUMNS[1] => sector(1),
        SECTOR_COLUMNS[2] => sector(2)
    )
}

/// Mean lap time of the same driver in two sessions
#[derive(Debug, Clone, PartialEq)]
pub struct PairedMeans {
    pub driver: String,
    pub reference_s: f64,
    pub compare_s: f64,
}

/// Inner join of two aggregate tables on driver code, ordered by driver
pub fn compare_means(
    reference: &[DriverAggregate],
    compare: &[DriverAggregate],
) -> Result<Vec<PairedMeans>, AnalysisError> {
    let to_frame = |aggregates: &[DriverAggregate], name: &str| -> PolarsResult<DataFrame> {
        let drivers: Vec<&str> = aggregates.iter().map(|a| a.driver.as_str()).collect();
        let means: Vec<f64> = aggregates.iter().map(|a| a.mean_lap_s).collect();
        df!(DRIVER => drivers, name => means)
    };

    let joined = to_frame(reference, "reference_s")?
        .lazy()
        .join(
            to_frame(compare, "compare_s")?.lazy(),
            [col(DRIVER)],
            [col(DRIVER)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DRIVER], SortMultipleOptions::default())
        .collect()?;

    let driver_col = joined.column(DRIVER)?.str()?;
    let reference_col = joined.column("reference_s")?.f64()?;
    let compare_col = joined.column("compare_s")?.f64()?;

    let mut pairs = Vec::with_capacity(joined.height());
    for i in 0..joined.height() {
        if let (Some(driver), Some(r), Some(c)) =
            (driver_col.get(i), reference_col.get(i), compare_col.get(i))
        {
            pairs.push(PairedMeans {
                driver: driver.to_string(),
                reference_s: r,
                compare_s: c,
            });
        }
    }

    let unmatched = (reference.len() + compare.len()).saturating_sub(2 * pairs.len());
    if unmatched > 0 {
        tracing::debug!("{} drivers appear in only one session and were dropped", unmatched);
    }

    Ok(pairs)
}
