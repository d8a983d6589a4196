//! Clients for the upstream timing and results APIs
//!
//! Two public providers are used:
//! - an Ergast-compatible API (schedule, race/sprint results, race lap timings)
//! - OpenF1 (sessions, drivers, laps with sector times, location and car data)
//!
//! # Example
//!
//! ```no_run
//! use f1_analytics::provider::{ApiClient, ProviderConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new(ProviderConfig::default())?;
//!
//!     let schedule = client.race_schedule(2024).await?;
//!     println!("{} rounds", schedule.len());
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod client;
pub mod ergast;
pub mod openf1;

pub use cache::ResponseCache;
pub use client::ApiClient;
pub use ergast::{parse_lap_time, ScheduledEvent};

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ERGAST_URL: &str = "https://api.jolpi.ca/ergast/f1";
pub const DEFAULT_OPENF1_URL: &str = "https://api.openf1.org/v1";

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    #[error("No event matching '{event}' in the {season} schedule")]
    UnknownEvent { season: u16, event: String },

    #[error("No {kind} session found for {season} {event}")]
    SessionNotFound {
        season: u16,
        event: String,
        kind: String,
    },

    #[error("Unknown driver '{0}' in this session")]
    UnknownDriver(String),
}

/// Provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub ergast_base_url: String,
    pub openf1_base_url: String,
    /// Minimum delay between requests in milliseconds
    pub delay_ms: u64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Directory for cached response bodies; caching is off when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ergast_base_url: DEFAULT_ERGAST_URL.to_string(),
            openf1_base_url: DEFAULT_OPENF1_URL.to_string(),
            // jolpica allows 4 requests per second
            delay_ms: 300,
            timeout_secs: 30,
            user_agent: concat!("f1-analytics/", env!("CARGO_PKG_VERSION")).to_string(),
            cache_dir: None,
        }
    }
}
