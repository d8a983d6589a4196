//! Plain result tables

use colored::Colorize;
use std::fmt::Write;

use crate::models::WetPerformanceRow;
use crate::predictor::PredictionReport;

fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        name.chars().take(max_len).collect()
    }
}

/// Ranked race-time predictions, fastest first
pub fn render_predictions(report: &PredictionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Predicted race pace".yellow().bold());
    let _ = writeln!(
        out,
        "{:>4} {:<22} {:<5} {:>10} {:>12}",
        "Pos", "Driver", "Code", "Quali (s)", "Race (s)"
    );
    let _ = writeln!(out, "{}", "-".repeat(57));

    for (i, row) in report.rows.iter().enumerate() {
        let quali = row.features.first().copied().unwrap_or(f64::NAN);
        let line = format!(
            "{:>4} {:<22} {:<5} {:>10.3} {:>12.3}",
            i + 1,
            truncate_name(&row.driver_name, 22),
            row.driver_code,
            quali,
            row.predicted_race_time_s
        );
        if i == 0 {
            let _ = writeln!(out, "{}", line.green().bold());
        } else {
            let _ = writeln!(out, "{}", line);
        }
    }

    if let Some(winner) = report.winner() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Predicted winner: {}",
            winner.driver_name.as_str().green().bold()
        );
    }
    out
}

/// Rows used, holdout size and MAE
pub fn render_training_summary(report: &PredictionReport) -> String {
    let mae = match report.mae {
        Some(mae) => format!("{:.3} s", mae),
        None => "n/a".to_string(),
    };
    format!(
        "Features: {}\nTraining rows: {}  Holdout rows: {}\nModel error (MAE): {}\n",
        report.feature_names.join(", "),
        report.train_rows,
        report.test_rows,
        mae
    )
}

/// Wet-performance ranking, highest score first
pub fn render_wet_performance(rows: &[WetPerformanceRow]) -> String {
    let mut sorted: Vec<&WetPerformanceRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Wet performance".yellow().bold());
    let _ = writeln!(
        out,
        "{:<6} {:>10} {:>10} {:>10} {:>9} {:>8}",
        "Driver", "Dry (s)", "Wet (s)", "Diff (s)", "Change %", "Score"
    );
    let _ = writeln!(out, "{}", "-".repeat(58));

    for row in sorted {
        let score = format!("{:>8.4}", row.score);
        let score = if row.score >= 1.0 {
            score.green()
        } else {
            score.normal()
        };
        let _ = writeln!(
            out,
            "{:<6} {:>10.3} {:>10.3} {:>10.3} {:>9.2} {}",
            row.driver, row.dry_mean_s, row.wet_mean_s, row.difference_s, row.change_pct, score
        );
    }
    out
}
