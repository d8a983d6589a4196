//! Qualifying table loading from CSV

use polars::prelude::*;
use std::path::Path;

use crate::error::{validate_lap_time, AnalysisError};
use crate::models::QualifyingEntry;
use crate::roster;

/// Load a qualifying table.
///
/// Expected columns: `driver` (full name) and `qualifying_time_s`, plus an
/// optional `driver_code`. Names without a code are looked up in the roster;
/// rows that cannot be mapped are skipped.
pub fn load_qualifying_csv<P: AsRef<Path>>(csv_path: P) -> Result<Vec<QualifyingEntry>, AnalysisError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
        .finish()?;

    qualifying_from_frame(&df)
}

fn qualifying_from_frame(df: &DataFrame) -> Result<Vec<QualifyingEntry>, AnalysisError> {
    let name_col = df.column("driver")?.str()?;
    let times = df.column("qualifying_time_s")?.cast(&DataType::Float64)?;
    let time_col = times.f64()?;
    let code_col = df.column("driver_code").ok().and_then(|c| c.str().ok());

    let mut entries = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(name) = name_col.get(i) else {
            continue;
        };
        let code = code_col
            .and_then(|c| c.get(i))
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .or_else(|| roster::code_for(name).map(str::to_string));

        let Some(code) = code else {
            tracing::warn!("No driver code for '{}', skipping", name);
            continue;
        };

        let time = time_col.get(i).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("Missing qualifying time for {}", name))
        })?;
        validate_lap_time(time)?;

        entries.push(QualifyingEntry {
            driver_name: name.trim().to_string(),
            driver_code: code,
            qualifying_time_s: time,
        });
    }

    Ok(entries)
}
