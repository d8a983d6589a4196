//! Table reshaping: lap aggregation, feature joins and the points pivot

pub mod features;
pub mod laps;
pub mod points;
pub mod qualifying;

// Re-export commonly used types
pub use features::{
    build_prediction_input, build_training_set, FeatureSet, Granularity, PredictionInput,
    TrainingSet,
};
pub use laps::{compare_means, mean_lap_times, PairedMeans};
pub use points::{combine_round, DriverPoints, PointsTable, RaceLabel};
pub use qualifying::load_qualifying_csv;
