//! Terminal rendering of analysis results

pub mod color;
pub mod heatmap;
pub mod table;
mod terminal;
pub mod track_map;

pub use color::{ColorScale, Rgb, BLUES, PLASMA};
pub use heatmap::render_points_heatmap;
pub use table::{render_predictions, render_training_summary, render_wet_performance};
pub use track_map::{render_track_map, TrackMapOptions};
