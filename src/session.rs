//! Session loading: resolves (season, event, session type) and materializes
//! lap-level and result-level tables

use crate::models::{EventRef, LapRecord, ResultRow, SessionId, SessionKind, TelemetrySample};
use crate::provider::openf1::{merge_telemetry, pick_session, to_lap_records};
use crate::provider::{ApiClient, ProviderConfig, ProviderError, ScheduledEvent};
use serde::{Deserialize, Serialize};

/// Lap and result tables for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub event: ScheduledEvent,
    pub laps: Vec<LapRecord>,
    pub results: Vec<ResultRow>,
}

impl Session {
    /// Laps of one driver
    pub fn laps_for<'a>(&'a self, driver: &'a str) -> impl Iterator<Item = &'a LapRecord> {
        self.laps.iter().filter(move |l| l.driver == driver)
    }

    pub fn has_sector_times(&self) -> bool {
        self.laps.iter().any(|l| l.sectors.iter().any(Option::is_some))
    }
}

/// Race and sprint classification for one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResults {
    pub event: ScheduledEvent,
    pub race: Vec<ResultRow>,
    pub sprint: Option<Vec<ResultRow>>,
}

/// Find an event in a season schedule
pub fn resolve_event<'a>(
    schedule: &'a [ScheduledEvent],
    season: u16,
    event: &EventRef,
) -> Result<&'a ScheduledEvent, ProviderError> {
    let found = match event {
        EventRef::Round(round) => schedule.iter().find(|e| e.round == *round),
        EventRef::Location(name) => schedule.iter().find(|e| e.matches(name)),
    };
    found.ok_or_else(|| ProviderError::UnknownEvent {
        season,
        event: event.to_string(),
    })
}

pub struct SessionLoader {
    client: ApiClient,
}

impl SessionLoader {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn resolve(&self, id: &SessionId) -> Result<ScheduledEvent, ProviderError> {
        let schedule = self.client.race_schedule(id.season).await?;
        resolve_event(&schedule, id.season, &id.event).cloned()
    }

    fn not_found(id: &SessionId) -> ProviderError {
        ProviderError::SessionNotFound {
            season: id.season,
            event: id.event.to_string(),
            kind: id.kind.to_string(),
        }
    }

    /// Load lap and result tables for a session
    pub async fn load(&self, id: &SessionId) -> Result<Session, ProviderError> {
        let event = self.resolve(id).await?;
        tracing::info!(
            "Loading {} {} ({}, round {})",
            id.season,
            event.race_name,
            id.kind,
            event.round
        );

        let label = id.label();
        let sessions = self.client.sessions(id.season).await?;

        let laps = match pick_session(&sessions, id.kind, event.date) {
            Some(found) => {
                let drivers = self.client.drivers(found.session_key).await?;
                let laps = self.client.laps(found.session_key).await?;
                to_lap_records(&laps, &drivers, &label)
            }
            None if id.kind == SessionKind::Race => {
                tracing::info!("No timing session for {}, using race lap timings", label);
                self.client
                    .lap_timings(id.season, event.round, &label)
                    .await?
            }
            None => return Err(Self::not_found(id)),
        };

        let results = match id.kind {
            SessionKind::Race => self.client.race_results(id.season, event.round).await?,
            SessionKind::Sprint => self
                .client
                .sprint_results(id.season, event.round)
                .await?
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        tracing::info!(
            "{}: {} laps, {} classified drivers",
            label,
            laps.len(),
            results.len()
        );

        Ok(Session {
            id: id.clone(),
            event,
            laps,
            results,
        })
    }

    /// Position and speed samples for one driver across the whole session
    pub async fn telemetry(
        &self,
        id: &SessionId,
        driver_code: &str,
    ) -> Result<Vec<TelemetrySample>, ProviderError> {
        let event = self.resolve(id).await?;
        let sessions = self.client.sessions(id.season).await?;
        let session = pick_session(&sessions, id.kind, event.date).ok_or_else(|| Self::not_found(id))?;

        let drivers = self.client.drivers(session.session_key).await?;
        let driver_number = drivers
            .iter()
            .find(|d| {
                d.name_acronym
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(driver_code))
            })
            .map(|d| d.driver_number)
            .ok_or_else(|| ProviderError::UnknownDriver(driver_code.to_string()))?;

        tracing::info!(
            "Loading telemetry for {} (#{}) in {}",
            driver_code,
            driver_number,
            id.label()
        );

        let locations = self
            .client
            .locations(session.session_key, driver_number)
            .await?;
        let car_data = self
            .client
            .car_data(session.session_key, driver_number)
            .await?;

        Ok(merge_telemetry(&locations, &car_data))
    }

    /// Race and sprint results for every round of a season
    pub async fn season_results(&self, season: u16) -> Result<Vec<RoundResults>, ProviderError> {
        let schedule = self.client.race_schedule(season).await?;
        let mut rounds = Vec::with_capacity(schedule.len());

        for event in schedule {
            let race = self.client.race_results(season, event.round).await?;
            if race.is_empty() {
                tracing::debug!("Round {} has no results yet, stopping", event.round);
                break;
            }
            let sprint = self.client.sprint_results(season, event.round).await?;
            rounds.push(RoundResults {
                event,
                race,
                sprint,
            });
        }

        tracing::info!("Loaded results for {} rounds of {}", rounds.len(), season);
        Ok(rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(round: u8, race_name: &str, country: &str) -> ScheduledEvent {
        ScheduledEvent {
            season: 2024,
            round,
            race_name: race_name.to_string(),
            circuit_name: format!("{} circuit", country),
            locality: country.to_string(),
            country: country.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, round as u32).unwrap(),
        }
    }

    #[test]
    fn test_resolve_event_by_round_and_name() {
        let schedule = vec![
            event(8, "Monaco Grand Prix", "Monaco"),
            event(9, "Canadian Grand Prix", "Canada"),
        ];

        let by_round = resolve_event(&schedule, 2024, &EventRef::Round(9)).unwrap();
        assert_eq!(by_round.country, "Canada");

        let by_name =
            resolve_event(&schedule, 2024, &EventRef::Location("monaco".to_string())).unwrap();
        assert_eq!(by_name.round, 8);
    }

    #[test]
    fn test_resolve_unknown_event() {
        let schedule = vec![event(8, "Monaco Grand Prix", "Monaco")];
        let err = resolve_event(&schedule, 2024, &EventRef::Round(30)).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownEvent { season: 2024, .. }));
    }

    #[test]
    fn test_session_helpers() {
        let lap = |driver: &str, sector: Option<std::time::Duration>| LapRecord {
            driver: driver.to_string(),
            lap_number: 1,
            lap_time: Some(std::time::Duration::from_secs(75)),
            sectors: [sector, None, None],
            session: "test".to_string(),
        };
        let session = Session {
            id: SessionId::new(2024, EventRef::Round(8), SessionKind::Race),
            event: event(8, "Monaco Grand Prix", "Monaco"),
            laps: vec![lap("LEC", None), lap("PIA", None), lap("LEC", None)],
            results: Vec::new(),
        };

        assert_eq!(session.laps_for("LEC").count(), 2);
        assert!(!session.has_sector_times());
    }
}
