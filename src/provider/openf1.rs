//! OpenF1 endpoints: sessions, drivers, laps, location and car data

use super::{ApiClient, ProviderError};
use crate::models::{LapRecord, SessionKind, TelemetrySample};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenF1Session {
    pub session_key: u32,
    pub session_name: String,
    pub date_start: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    pub year: u16,
}

impl OpenF1Session {
    pub fn start_date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.date_start)
            .ok()
            .map(|d| d.date_naive())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenF1Driver {
    pub driver_number: u32,
    #[serde(default)]
    pub name_acronym: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenF1Lap {
    pub driver_number: u32,
    pub lap_number: u16,
    #[serde(default)]
    pub lap_duration: Option<f64>,
    #[serde(default)]
    pub duration_sector_1: Option<f64>,
    #[serde(default)]
    pub duration_sector_2: Option<f64>,
    #[serde(default)]
    pub duration_sector_3: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenF1Location {
    pub date: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenF1CarData {
    pub date: String,
    pub speed: f64,
}

fn seconds(value: Option<f64>) -> Option<Duration> {
    value.and_then(|v| Duration::try_from_secs_f64(v).ok())
}

/// Pick the session of the given kind that starts during a race weekend.
///
/// Weekends start at most three days before the race (Thursday media day is
/// not a session), so the window is [race_date - 3, race_date].
pub fn pick_session<'a>(
    sessions: &'a [OpenF1Session],
    kind: SessionKind,
    race_date: NaiveDate,
) -> Option<&'a OpenF1Session> {
    let names = kind.provider_names();
    sessions.iter().find(|s| {
        let name_matches = names.iter().any(|n| n.eq_ignore_ascii_case(&s.session_name));
        let in_weekend = s
            .start_date()
            .map(|d| {
                let days = (race_date - d).num_days();
                (0..=3).contains(&days)
            })
            .unwrap_or(false);
        name_matches && in_weekend
    })
}

/// Map OpenF1 laps to lap records keyed by three-letter code
pub fn to_lap_records(laps: &[OpenF1Lap], drivers: &[OpenF1Driver], session: &str) -> Vec<LapRecord> {
    let codes: HashMap<u32, &str> = drivers
        .iter()
        .filter_map(|d| d.name_acronym.as_deref().map(|code| (d.driver_number, code)))
        .collect();

    laps.iter()
        .filter_map(|lap| {
            let Some(code) = codes.get(&lap.driver_number) else {
                tracing::debug!("Dropping lap for unknown car number {}", lap.driver_number);
                return None;
            };
            Some(LapRecord {
                driver: (*code).to_string(),
                lap_number: lap.lap_number,
                lap_time: seconds(lap.lap_duration),
                sectors: [
                    seconds(lap.duration_sector_1),
                    seconds(lap.duration_sector_2),
                    seconds(lap.duration_sector_3),
                ],
                session: session.to_string(),
            })
        })
        .collect()
}

fn timestamp_millis(date: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(date)
        .ok()
        .map(|d| d.timestamp_millis())
}

/// Attach to each position sample the speed from the car-data sample closest
/// in time
pub fn merge_telemetry(locations: &[OpenF1Location], car_data: &[OpenF1CarData]) -> Vec<TelemetrySample> {
    let mut speeds: Vec<(i64, f64)> = car_data
        .iter()
        .filter_map(|c| timestamp_millis(&c.date).map(|t| (t, c.speed)))
        .collect();
    speeds.sort_by_key(|(t, _)| *t);

    let mut positions: Vec<(i64, f64, f64)> = locations
        .iter()
        .filter_map(|l| timestamp_millis(&l.date).map(|t| (t, l.x, l.y)))
        .collect();
    positions.sort_by_key(|(t, _, _)| *t);

    if speeds.is_empty() {
        return Vec::new();
    }

    let mut samples = Vec::with_capacity(positions.len());
    let mut idx = 0;
    for (t, x, y) in positions {
        while idx + 1 < speeds.len() && (speeds[idx + 1].0 - t).abs() <= (speeds[idx].0 - t).abs() {
            idx += 1;
        }
        samples.push(TelemetrySample {
            x,
            y,
            speed: speeds[idx].1,
        });
    }
    samples
}

impl ApiClient {
    /// All sessions of a year
    pub async fn sessions(&self, year: u16) -> Result<Vec<OpenF1Session>, ProviderError> {
        let base = self.config().openf1_base_url.clone();
        self.get_json_or_default(&base, "sessions", &[("year", year.to_string())])
            .await
    }

    pub async fn drivers(&self, session_key: u32) -> Result<Vec<OpenF1Driver>, ProviderError> {
        let base = self.config().openf1_base_url.clone();
        self.get_json_or_default(&base, "drivers", &[("session_key", session_key.to_string())])
            .await
    }

    pub async fn laps(&self, session_key: u32) -> Result<Vec<OpenF1Lap>, ProviderError> {
        let base = self.config().openf1_base_url.clone();
        self.get_json_or_default(&base, "laps", &[("session_key", session_key.to_string())])
            .await
    }

    pub async fn locations(
        &self,
        session_key: u32,
        driver_number: u32,
    ) -> Result<Vec<OpenF1Location>, ProviderError> {
        let base = self.config().openf1_base_url.clone();
        self.get_json_or_default(
            &base,
            "location",
            &[
                ("session_key", session_key.to_string()),
                ("driver_number", driver_number.to_string()),
            ],
        )
        .await
    }

    pub async fn car_data(
        &self,
        session_key: u32,
        driver_number: u32,
    ) -> Result<Vec<OpenF1CarData>, ProviderError> {
        let base = self.config().openf1_base_url.clone();
        self.get_json_or_default(
            &base,
            "car_data",
            &[
                ("session_key", session_key.to_string()),
                ("driver_number", driver_number.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(key: u32, name: &str, date_start: &str) -> OpenF1Session {
        OpenF1Session {
            session_key: key,
            session_name: name.to_string(),
            date_start: date_start.to_string(),
            location: Some("Monaco".to_string()),
            country_name: Some("Monaco".to_string()),
            year: 2024,
        }
    }

    #[test]
    fn test_decode_laps() {
        let json = r#"[
            {"meeting_key": 1236, "session_key": 9523, "driver_number": 16, "lap_number": 2,
             "date_start": "2024-05-26T13:48:11.270000+00:00",
             "duration_sector_1": 20.713, "duration_sector_2": 38.914, "duration_sector_3": 19.876,
             "lap_duration": 79.503, "is_pit_out_lap": false},
            {"meeting_key": 1236, "session_key": 9523, "driver_number": 16, "lap_number": 1,
             "date_start": null, "duration_sector_1": null, "duration_sector_2": 40.1,
             "duration_sector_3": 21.2, "lap_duration": null, "is_pit_out_lap": false}
        ]"#;
        let laps: Vec<OpenF1Lap> = serde_json::from_str(json).unwrap();
        assert_eq!(laps.len(), 2);
        assert_eq!(laps[0].lap_duration, Some(79.503));
        assert_eq!(laps[1].lap_duration, None);
    }

    #[test]
    fn test_to_lap_records_maps_codes() {
        let laps = vec![
            OpenF1Lap {
                driver_number: 16,
                lap_number: 2,
                lap_duration: Some(79.5),
                duration_sector_1: Some(20.7),
                duration_sector_2: None,
                duration_sector_3: Some(19.9),
            },
            OpenF1Lap {
                driver_number: 99,
                lap_number: 2,
                lap_duration: Some(80.0),
                duration_sector_1: None,
                duration_sector_2: None,
                duration_sector_3: None,
            },
        ];
        let drivers = vec![OpenF1Driver {
            driver_number: 16,
            name_acronym: Some("LEC".to_string()),
            full_name: Some("Charles LECLERC".to_string()),
        }];

        let records = to_lap_records(&laps, &drivers, "2024 Monaco R");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].driver, "LEC");
        assert!((records[0].lap_time_secs().unwrap() - 79.5).abs() < 1e-6);
        assert!(records[0].sectors[1].is_none());
        assert!((records[0].sector_secs(2).unwrap() - 19.9).abs() < 1e-6);
    }

    #[test]
    fn test_pick_session_by_kind_and_weekend() {
        let sessions = vec![
            session(9000, "Race", "2024-05-19T13:00:00+00:00"),
            session(9519, "Qualifying", "2024-05-25T14:00:00+00:00"),
            session(9523, "Race", "2024-05-26T13:00:00+00:00"),
        ];
        let race_date = NaiveDate::from_ymd_opt(2024, 5, 26).unwrap();

        let race = pick_session(&sessions, SessionKind::Race, race_date).unwrap();
        assert_eq!(race.session_key, 9523);

        let quali = pick_session(&sessions, SessionKind::Qualifying, race_date).unwrap();
        assert_eq!(quali.session_key, 9519);

        assert!(pick_session(&sessions, SessionKind::Sprint, race_date).is_none());
    }

    #[test]
    fn test_pick_session_sprint_shootout_alias() {
        let sessions = vec![session(9100, "Sprint Shootout", "2023-07-29T10:30:00+00:00")];
        let race_date = NaiveDate::from_ymd_opt(2023, 7, 30).unwrap();
        let picked = pick_session(&sessions, SessionKind::SprintQualifying, race_date);
        assert_eq!(picked.map(|s| s.session_key), Some(9100));
    }

    #[test]
    fn test_merge_telemetry_nearest_speed() {
        let locations = vec![
            OpenF1Location {
                date: "2024-05-26T13:03:31.000000+00:00".to_string(),
                x: 100.0,
                y: 200.0,
            },
            OpenF1Location {
                date: "2024-05-26T13:03:31.260000+00:00".to_string(),
                x: 110.0,
                y: 205.0,
            },
            OpenF1Location {
                date: "bad date".to_string(),
                x: 0.0,
                y: 0.0,
            },
        ];
        let car_data = vec![
            OpenF1CarData {
                date: "2024-05-26T13:03:30.950000+00:00".to_string(),
                speed: 150.0,
            },
            OpenF1CarData {
                date: "2024-05-26T13:03:31.200000+00:00".to_string(),
                speed: 160.0,
            },
        ];

        let samples = merge_telemetry(&locations, &car_data);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].speed, 150.0);
        assert_eq!(samples[1].speed, 160.0);
        assert_eq!(samples[1].x, 110.0);
    }

    #[test]
    fn test_merge_telemetry_without_speed() {
        let locations = vec![OpenF1Location {
            date: "2024-05-26T13:03:31+00:00".to_string(),
            x: 1.0,
            y: 2.0,
        }];
        assert!(merge_telemetry(&locations, &[]).is_empty());
    }
}
