//! Season points pivot: drivers x rounds

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::ResultRow;
use crate::session::RoundResults;

/// Column header of the pivot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceLabel {
    pub round: u8,
    pub name: String,
}

/// One row of the pivot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverPoints {
    pub driver: String,
    pub by_round: BTreeMap<u8, f64>,
    pub total: f64,
}

impl DriverPoints {
    /// Points scored in a round, `None` if the driver did not take part
    pub fn points_in(&self, round: u8) -> Option<f64> {
        self.by_round.get(&round).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsTable {
    pub races: Vec<RaceLabel>,
    pub rows: Vec<DriverPoints>,
}

/// Race points plus sprint points per driver.
///
/// Drivers are taken from the race classification; a missing sprint result
/// adds nothing.
pub fn combine_round(race: &[ResultRow], sprint: Option<&[ResultRow]>) -> Vec<(String, f64)> {
    let sprint_points: HashMap<&str, f64> = sprint
        .unwrap_or_default()
        .iter()
        .map(|r| (r.driver_code.as_str(), r.points))
        .collect();

    race.iter()
        .map(|r| {
            let extra = sprint_points
                .get(r.driver_code.as_str())
                .copied()
                .unwrap_or(0.0);
            (r.driver_code.clone(), r.points + extra)
        })
        .collect()
}

impl PointsTable {
    /// Pivot a season of results, rows ordered by total points (highest first)
    pub fn from_rounds(rounds: &[RoundResults]) -> Self {
        let mut races = Vec::with_capacity(rounds.len());
        let mut by_driver: HashMap<String, BTreeMap<u8, f64>> = HashMap::new();

        for round in rounds {
            let number = round.event.round;
            races.push(RaceLabel {
                round: number,
                name: round.event.short_name().to_string(),
            });

            for (driver, points) in combine_round(&round.race, round.sprint.as_deref()) {
                *by_driver.entry(driver).or_default().entry(number).or_insert(0.0) += points;
            }
        }

        let mut rows: Vec<DriverPoints> = by_driver
            .into_iter()
            .map(|(driver, by_round)| {
                let total = by_round.values().sum();
                DriverPoints {
                    driver,
                    by_round,
                    total,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.driver.cmp(&b.driver))
        });

        Self { races, rows }
    }

    /// Largest single-round score, used to scale colours
    pub fn max_cell(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| r.by_round.values())
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn row(&self, driver: &str) -> Option<&DriverPoints> {
        self.rows.iter().find(|r| r.driver == driver)
    }
}
