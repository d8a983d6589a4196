//! Ergast-compatible endpoints: schedule, results, sprint results, lap timings

use super::{ApiClient, ProviderError};
use crate::models::{LapRecord, ResultRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Page size accepted by the API
const PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Debug, Deserialize)]
struct MrData {
    #[serde(default)]
    total: Option<String>,
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Debug, Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<ErgastRace>,
}

#[derive(Debug, Deserialize)]
struct ErgastRace {
    round: String,
    #[serde(rename = "raceName")]
    race_name: String,
    #[serde(rename = "Circuit")]
    circuit: ErgastCircuit,
    date: String,
    #[serde(rename = "Results", default)]
    results: Vec<ErgastResult>,
    #[serde(rename = "SprintResults", default)]
    sprint_results: Vec<ErgastResult>,
    #[serde(rename = "Laps", default)]
    laps: Vec<ErgastLap>,
}

#[derive(Debug, Deserialize)]
struct ErgastCircuit {
    #[serde(rename = "circuitName")]
    circuit_name: String,
    #[serde(rename = "Location")]
    location: ErgastLocation,
}

#[derive(Debug, Deserialize)]
struct ErgastLocation {
    locality: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ErgastResult {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    points: Option<String>,
    #[serde(default)]
    grid: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "Driver")]
    driver: ErgastDriver,
}

#[derive(Debug, Deserialize)]
struct ErgastDriver {
    #[serde(rename = "driverId")]
    driver_id: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "givenName")]
    given_name: String,
    #[serde(rename = "familyName")]
    family_name: String,
}

impl ErgastDriver {
    /// Three-letter code; drivers from before codes existed get one derived
    /// from their family name
    fn code(&self) -> String {
        match &self.code {
            Some(code) if !code.is_empty() => code.clone(),
            _ => self
                .family_name
                .chars()
                .filter(|c| c.is_alphabetic())
                .take(3)
                .collect::<String>()
                .to_uppercase(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErgastLap {
    number: String,
    #[serde(rename = "Timings", default)]
    timings: Vec<ErgastTiming>,
}

#[derive(Debug, Deserialize)]
struct ErgastTiming {
    #[serde(rename = "driverId")]
    driver_id: String,
    time: String,
}

/// One round of a season schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub season: u16,
    pub round: u8,
    pub race_name: String,
    pub circuit_name: String,
    pub locality: String,
    pub country: String,
    pub date: NaiveDate,
}

impl ScheduledEvent {
    /// Race name without the " Grand Prix" suffix
    pub fn short_name(&self) -> &str {
        self.race_name
            .strip_suffix(" Grand Prix")
            .unwrap_or(&self.race_name)
    }

    /// Case-insensitive match on race name, locality, country or circuit
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        [
            self.race_name.as_str(),
            self.short_name(),
            self.locality.as_str(),
            self.country.as_str(),
            self.circuit_name.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase() == query)
            || self.race_name.to_lowercase().contains(&query)
    }
}

/// Parse a lap time like "1:23.456" or "83.456"
pub fn parse_lap_time(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (minutes, seconds) = match text.split_once(':') {
        Some((m, s)) => (m.parse::<u64>().ok()?, s.parse::<f64>().ok()?),
        None => (0, text.parse::<f64>().ok()?),
    };
    if !(0.0..60.0).contains(&seconds) && minutes > 0 {
        return None;
    }
    let total = minutes as f64 * 60.0 + seconds;
    Duration::try_from_secs_f64(total).ok()
}

fn parse_u8(value: Option<&String>) -> Option<u8> {
    value.and_then(|v| v.parse().ok())
}

fn to_result_rows(results: &[ErgastResult]) -> Vec<ResultRow> {
    results
        .iter()
        .map(|r| ResultRow {
            driver_code: r.driver.code(),
            driver_name: format!("{} {}", r.driver.given_name, r.driver.family_name),
            position: parse_u8(r.position.as_ref()),
            grid: parse_u8(r.grid.as_ref()),
            points: r
                .points
                .as_deref()
                .and_then(|p| p.parse().ok())
                .unwrap_or(0.0),
            status: r.status.clone().unwrap_or_default(),
        })
        .collect()
}

fn to_scheduled_event(season: u16, race: &ErgastRace) -> Option<ScheduledEvent> {
    Some(ScheduledEvent {
        season,
        round: race.round.parse().ok()?,
        race_name: race.race_name.clone(),
        circuit_name: race.circuit.circuit_name.clone(),
        locality: race.circuit.location.locality.clone(),
        country: race.circuit.location.country.clone(),
        date: NaiveDate::parse_from_str(&race.date, "%Y-%m-%d").ok()?,
    })
}

fn flatten_timings(
    races: &[ErgastRace],
    codes: &HashMap<String, String>,
    session: &str,
) -> Vec<LapRecord> {
    let mut laps = Vec::new();
    for lap in races.iter().flat_map(|r| &r.laps) {
        let lap_number = lap.number.parse::<u16>().unwrap_or(0);
        for timing in &lap.timings {
            let Some(code) = codes.get(&timing.driver_id) else {
                tracing::debug!("Dropping lap for unclassified driver {}", timing.driver_id);
                continue;
            };
            laps.push(LapRecord {
                driver: code.clone(),
                lap_number,
                lap_time: parse_lap_time(&timing.time),
                sectors: [None, None, None],
                session: session.to_string(),
            });
        }
    }
    laps
}

impl ApiClient {
    async fn race_table(
        &self,
        path: &str,
        offset: usize,
    ) -> Result<(Vec<ErgastRace>, usize), ProviderError> {
        let base = self.config().ergast_base_url.clone();
        let envelope: Envelope = self
            .get_json(
                &base,
                path,
                &[
                    ("limit", PAGE_LIMIT.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        let total = envelope
            .mr_data
            .total
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        Ok((envelope.mr_data.race_table.races, total))
    }

    /// Season schedule ordered by round
    pub async fn race_schedule(&self, season: u16) -> Result<Vec<ScheduledEvent>, ProviderError> {
        tracing::info!("Loading {} schedule", season);
        let (races, _) = self.race_table(&format!("{}.json", season), 0).await?;

        let mut events: Vec<ScheduledEvent> = races
            .iter()
            .filter_map(|r| to_scheduled_event(season, r))
            .collect();
        events.sort_by_key(|e| e.round);
        Ok(events)
    }

    /// Race classification for one round
    pub async fn race_results(&self, season: u16, round: u8) -> Result<Vec<ResultRow>, ProviderError> {
        let (races, _) = self
            .race_table(&format!("{}/{}/results.json", season, round), 0)
            .await?;
        Ok(races
            .first()
            .map(|r| to_result_rows(&r.results))
            .unwrap_or_default())
    }

    /// Sprint classification for one round, `None` for non-sprint weekends
    pub async fn sprint_results(
        &self,
        season: u16,
        round: u8,
    ) -> Result<Option<Vec<ResultRow>>, ProviderError> {
        let (races, _) = self
            .race_table(&format!("{}/{}/sprint.json", season, round), 0)
            .await?;
        Ok(races
            .first()
            .filter(|r| !r.sprint_results.is_empty())
            .map(|r| to_result_rows(&r.sprint_results)))
    }

    /// Race lap times for one round (no sector times), following pagination
    pub async fn lap_timings(
        &self,
        season: u16,
        round: u8,
        session: &str,
    ) -> Result<Vec<LapRecord>, ProviderError> {
        // Timings carry driver ids; codes come from the classification
        let (classified, _) = self
            .race_table(&format!("{}/{}/results.json", season, round), 0)
            .await?;
        let codes: HashMap<String, String> = classified
            .iter()
            .flat_map(|r| &r.results)
            .map(|r| (r.driver.driver_id.clone(), r.driver.code()))
            .collect();

        let path = format!("{}/{}/laps.json", season, round);
        let mut laps = Vec::new();
        let mut offset = 0;

        loop {
            let (races, total) = self.race_table(&path, offset).await?;
            laps.extend(flatten_timings(&races, &codes, session));

            offset += PAGE_LIMIT;
            if offset >= total {
                break;
            }
        }

        tracing::info!("Loaded {} lap timings for {} round {}", laps.len(), season, round);
        Ok(laps)
    }
}
