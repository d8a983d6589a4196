//! F1 Analytics CLI - points heatmap, speed map, wet performance and race pace prediction

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use f1_analytics::core::gbm::BoostingConfig;
use f1_analytics::core::scoring::compare_sessions;
use f1_analytics::data::{
    build_prediction_input, build_training_set, load_qualifying_csv, mean_lap_times, FeatureSet,
    Granularity, PointsTable,
};
use f1_analytics::report::{
    render_points_heatmap, render_predictions, render_track_map, render_training_summary,
    render_wet_performance, TrackMapOptions,
};
use f1_analytics::{
    roster, EventRef, PredictorConfig, ProviderConfig, RacePredictor, SessionId, SessionKind,
    SessionLoader, WetPerformanceRow,
};

#[derive(Parser)]
#[command(name = "f1-analytics")]
#[command(author, version, about = "Formula 1 session analysis CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for cached API responses
    #[arg(long, global = true, env = "F1_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Minimum delay between API requests in milliseconds
    #[arg(long, global = true, default_value = "300")]
    delay: u64,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Championship points per driver and race as a heatmap
    Heatmap {
        #[arg(short, long, default_value = "2024")]
        season: u16,
    },

    /// Track outline of one driver coloured by speed
    SpeedMap {
        #[arg(short, long, default_value = "2024")]
        season: u16,

        /// Round number or location name
        #[arg(short, long, default_value = "Monaco")]
        event: EventRef,

        /// Session type (FP1, FP2, FP3, SQ, S, Q, R)
        #[arg(long, default_value = "R")]
        session: SessionKind,

        /// Three-letter driver code
        #[arg(short, long, default_value = "LEC")]
        driver: String,

        #[arg(long, default_value = "100")]
        width: usize,

        #[arg(long, default_value = "40")]
        height: usize,
    },

    /// Compare mean lap times at one venue in a wet and a dry season
    WetPerformance {
        #[arg(short, long, default_value = "Canada")]
        event: EventRef,

        #[arg(long, default_value = "2022")]
        wet_season: u16,

        #[arg(long, default_value = "2023")]
        dry_season: u16,

        #[arg(long, default_value = "R")]
        session: SessionKind,
    },

    /// Predict race pace from qualifying times
    Predict {
        /// Season of the historical session used for training
        #[arg(short, long, default_value = "2024")]
        season: u16,

        #[arg(short, long, default_value = "8")]
        event: EventRef,

        #[arg(long, default_value = "R")]
        session: SessionKind,

        /// Qualifying CSV (driver, qualifying_time_s[, driver_code]);
        /// defaults to the built-in 2025 Monaco table
        #[arg(short, long)]
        qualifying: Option<PathBuf>,

        /// Add mean sector times as predictors
        #[arg(long)]
        sectors: bool,

        /// Add the wet-performance score as a predictor
        #[arg(long)]
        wet_score: bool,

        #[arg(long, default_value = "Canada")]
        wet_event: EventRef,

        #[arg(long, default_value = "2022")]
        wet_season: u16,

        #[arg(long, default_value = "2023")]
        dry_season: u16,

        /// Train on individual laps instead of per-driver means
        #[arg(long)]
        per_lap: bool,

        #[arg(long, default_value = "100")]
        estimators: usize,

        #[arg(long, default_value = "0.1")]
        learning_rate: f64,

        #[arg(long, default_value = "3")]
        max_depth: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = ProviderConfig {
        delay_ms: cli.delay,
        cache_dir: cli.cache_dir.clone(),
        ..Default::default()
    };
    let loader = SessionLoader::new(config).context("Failed to create API client")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    match cli.command {
        Commands::Heatmap { season } => run_heatmap(&rt, &loader, season),
        Commands::SpeedMap {
            season,
            event,
            session,
            driver,
            width,
            height,
        } => {
            let id = SessionId::new(season, event, session);
            run_speed_map(&rt, &loader, &id, &driver, width, height)
        }
        Commands::WetPerformance {
            event,
            wet_season,
            dry_season,
            session,
        } => {
            let rows = wet_performance(&rt, &loader, &event, wet_season, dry_season, session)?;
            println!(
                "{}",
                format!("{} wet ({}) vs dry ({})", event, wet_season, dry_season).cyan()
            );
            print!("{}", render_wet_performance(&rows));
            Ok(())
        }
        Commands::Predict {
            season,
            event,
            session,
            qualifying,
            sectors,
            wet_score,
            wet_event,
            wet_season,
            dry_season,
            per_lap,
            estimators,
            learning_rate,
            max_depth,
            seed,
        } => {
            let id = SessionId::new(season, event, session);
            let features = FeatureSet { sectors, wet_score };
            let granularity = if per_lap {
                Granularity::Lap
            } else {
                Granularity::DriverMean
            };
            let config = PredictorConfig {
                boosting: BoostingConfig {
                    n_estimators: estimators,
                    learning_rate,
                    max_depth,
                    ..Default::default()
                },
                seed,
                ..Default::default()
            };
            let wet = wet_score.then_some((wet_event, wet_season, dry_season));
            run_predict(
                &rt,
                &loader,
                &id,
                qualifying,
                features,
                granularity,
                config,
                wet,
            )
        }
    }
}

/// Run a future on the runtime behind a spinner
fn with_spinner<F: Future>(rt: &tokio::runtime::Runtime, message: String, future: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));

    let output = rt.block_on(future);
    pb.finish_and_clear();
    output
}

fn run_heatmap(rt: &tokio::runtime::Runtime, loader: &SessionLoader, season: u16) -> Result<()> {
    let rounds = with_spinner(
        rt,
        format!("Fetching {} results...", season),
        loader.season_results(season),
    )
    .with_context(|| format!("Failed to load results for {}", season))?;

    let table = PointsTable::from_rounds(&rounds);
    print!("{}", render_points_heatmap(&table, season));
    Ok(())
}

fn run_speed_map(
    rt: &tokio::runtime::Runtime,
    loader: &SessionLoader,
    id: &SessionId,
    driver: &str,
    width: usize,
    height: usize,
) -> Result<()> {
    let driver = driver.to_uppercase();
    let samples = with_spinner(
        rt,
        format!("Fetching telemetry for {} in {}...", driver, id.label()),
        loader.telemetry(id, &driver),
    )
    .with_context(|| format!("Failed to load telemetry for {} in {}", driver, id.label()))?;

    let options = TrackMapOptions {
        width,
        height,
        title: format!("{} - {}'s speed", id.label(), driver),
    };
    print!("{}", render_track_map(&samples, &options));
    Ok(())
}

fn wet_performance(
    rt: &tokio::runtime::Runtime,
    loader: &SessionLoader,
    event: &EventRef,
    wet_season: u16,
    dry_season: u16,
    kind: SessionKind,
) -> Result<Vec<WetPerformanceRow>> {
    let wet_id = SessionId::new(wet_season, event.clone(), kind);
    let dry_id = SessionId::new(dry_season, event.clone(), kind);

    let (wet, dry) = with_spinner(
        rt,
        format!("Loading {} and {}...", wet_id.label(), dry_id.label()),
        async { Ok::<_, anyhow::Error>((loader.load(&wet_id).await?, loader.load(&dry_id).await?)) },
    )
    .context("Failed to load sessions for the wet comparison")?;

    let wet_means = mean_lap_times(&wet.laps)?;
    let dry_means = mean_lap_times(&dry.laps)?;
    let rows = compare_sessions(&wet_means, &dry_means)
        .with_context(|| format!("No comparison for {} vs {}", wet_id.label(), dry_id.label()))?;
    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
fn run_predict(
    rt: &tokio::runtime::Runtime,
    loader: &SessionLoader,
    id: &SessionId,
    qualifying: Option<PathBuf>,
    features: FeatureSet,
    granularity: Granularity,
    config: PredictorConfig,
    wet: Option<(EventRef, u16, u16)>,
) -> Result<()> {
    let qualifying = match qualifying {
        Some(path) => load_qualifying_csv(&path)
            .with_context(|| format!("Failed to load qualifying times from {:?}", path))?,
        None => roster::monaco_2025_qualifying(),
    };
    println!(
        "{}: {} qualifying entries, history from {}",
        "Predicting".green(),
        qualifying.len(),
        id.label()
    );

    let history = with_spinner(rt, format!("Loading {}...", id.label()), loader.load(id))
        .with_context(|| format!("Failed to load {}", id.label()))?;
    if features.sectors && !history.has_sector_times() {
        tracing::warn!("{} has no sector times; sector predictors will be zero", id.label());
    }
    let aggregates = mean_lap_times(&history.laps)?;

    let wet_rows = match wet {
        Some((event, wet_season, dry_season)) => {
            wet_performance(rt, loader, &event, wet_season, dry_season, SessionKind::Race)?
        }
        None => Vec::new(),
    };

    let training = build_training_set(
        &qualifying,
        &history.laps,
        &aggregates,
        &wet_rows,
        features,
        granularity,
    )?;
    let input = build_prediction_input(&qualifying, &aggregates, &wet_rows, features)?;

    let report = RacePredictor::new(config)
        .run(&training, &input)
        .context("Prediction failed")?;

    println!();
    print!("{}", render_training_summary(&report));
    println!();
    print!("{}", render_predictions(&report));
    Ok(())
}
