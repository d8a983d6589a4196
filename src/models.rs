use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Session type within a race weekend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Practice1,
    Practice2,
    Practice3,
    SprintQualifying,
    Sprint,
    Qualifying,
    Race,
}

impl SessionKind {
    /// Short identifier (FP1, SQ, R, ...)
    pub fn code(&self) -> &'static str {
        match self {
            SessionKind::Practice1 => "FP1",
            SessionKind::Practice2 => "FP2",
            SessionKind::Practice3 => "FP3",
            SessionKind::SprintQualifying => "SQ",
            SessionKind::Sprint => "S",
            SessionKind::Qualifying => "Q",
            SessionKind::Race => "R",
        }
    }

    /// Session names used by the timing provider for this kind.
    /// Sprint qualifying was called "Sprint Shootout" in 2023.
    pub fn provider_names(&self) -> &'static [&'static str] {
        match self {
            SessionKind::Practice1 => &["Practice 1"],
            SessionKind::Practice2 => &["Practice 2"],
            SessionKind::Practice3 => &["Practice 3"],
            SessionKind::SprintQualifying => &["Sprint Qualifying", "Sprint Shootout"],
            SessionKind::Sprint => &["Sprint"],
            SessionKind::Qualifying => &["Qualifying"],
            SessionKind::Race => &["Race"],
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fp1" | "practice 1" => Ok(SessionKind::Practice1),
            "fp2" | "practice 2" => Ok(SessionKind::Practice2),
            "fp3" | "practice 3" => Ok(SessionKind::Practice3),
            "sq" | "ss" | "sprint qualifying" | "sprint shootout" => {
                Ok(SessionKind::SprintQualifying)
            }
            "s" | "sprint" => Ok(SessionKind::Sprint),
            "q" | "qualifying" => Ok(SessionKind::Qualifying),
            "r" | "race" => Ok(SessionKind::Race),
            other => Err(format!("unknown session type '{}'", other)),
        }
    }
}

/// Event within a season, by round number or by location name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventRef {
    Round(u8),
    Location(String),
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventRef::Round(round) => write!(f, "round {}", round),
            EventRef::Location(name) => f.write_str(name),
        }
    }
}

impl FromStr for EventRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("event must not be empty".to_string());
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse::<u8>()
                .map(EventRef::Round)
                .map_err(|e| format!("invalid round '{}': {}", s, e));
        }
        Ok(EventRef::Location(s.to_string()))
    }
}

/// Identifies one session: (season, event, session type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionId {
    pub season: u16,
    pub event: EventRef,
    pub kind: SessionKind,
}

impl SessionId {
    pub fn new(season: u16, event: EventRef, kind: SessionKind) -> Self {
        Self {
            season,
            event,
            kind,
        }
    }

    /// Label used in tables and logs, e.g. "2024 Monaco R"
    pub fn label(&self) -> String {
        format!("{} {} {}", self.season, self.event, self.kind)
    }
}

/// One lap of one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub driver: String,
    pub lap_number: u16,
    pub lap_time: Option<Duration>,
    pub sectors: [Option<Duration>; 3],
    pub session: String,
}

impl LapRecord {
    pub fn lap_time_secs(&self) -> Option<f64> {
        self.lap_time.map(|d| d.as_secs_f64())
    }

    pub fn sector_secs(&self, idx: usize) -> Option<f64> {
        self.sectors.get(idx).copied().flatten().map(|d| d.as_secs_f64())
    }
}

/// One classified driver in a race or sprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub driver_code: String,
    pub driver_name: String,
    pub position: Option<u8>,
    pub grid: Option<u8>,
    pub points: f64,
    pub status: String,
}

/// Per-driver mean lap and sector times for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAggregate {
    pub driver: String,
    pub mean_lap_s: f64,
    pub mean_sectors_s: [Option<f64>; 3],
    pub laps: usize,
}

/// Qualifying time for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingEntry {
    pub driver_name: String,
    pub driver_code: String,
    pub qualifying_time_s: f64,
}

/// Wet vs dry comparison for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WetPerformanceRow {
    pub driver: String,
    pub wet_mean_s: f64,
    pub dry_mean_s: f64,
    /// Dry mean minus wet mean
    pub difference_s: f64,
    pub change_pct: f64,
    pub score: f64,
}

/// Predicted race pace for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub driver_name: String,
    pub driver_code: String,
    pub features: Vec<f64>,
    pub predicted_race_time_s: f64,
}

/// Car position and speed at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub x: f64,
    pub y: f64,
    /// km/h
    pub speed: f64,
}
