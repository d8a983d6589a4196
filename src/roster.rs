//! 2025 driver roster and the reference qualifying table
//!
//! Timing data is keyed by three-letter driver codes while the qualifying
//! table is written with full names; this module is the single place the two
//! are related.

use crate::models::QualifyingEntry;

/// Full name -> three-letter code for the 2025 grid
pub const DRIVER_ROSTER: [(&str, &str); 20] = [
    ("Lando Norris", "NOR"),
    ("Charles Leclerc", "LEC"),
    ("Oscar Piastri", "PIA"),
    ("Max Verstappen", "VER"),
    ("Isack Hadjar", "HAD"),
    ("Fernando Alonso", "ALO"),
    ("Lewis Hamilton", "HAM"),
    ("Esteban Ocon", "OCO"),
    ("Liam Lawson", "LAW"),
    ("Alexander Albon", "ALB"),
    ("Carlos Sainz", "SAI"),
    ("Yuki Tsunoda", "TSU"),
    ("Nico Hulkenberg", "HUL"),
    ("George Russell", "RUS"),
    ("Kimi Antonelli", "ANT"),
    ("Gabriel Bortoleto", "BOR"),
    ("Pierre Gasly", "GAS"),
    ("Franco Colapinto", "COL"),
    ("Lance Stroll", "STR"),
    ("Oliver Bearman", "BEA"),
];

/// 2025 Monaco qualifying, in starting-grid order (seconds).
///
/// Grid penalties: Stroll -4, Hamilton -3, Bearman -10.
/// Russell went out in Q2, so his Q1 time is used.
const MONACO_2025_QUALIFYING: [(&str, f64); 20] = [
    ("Lando Norris", 69.954),
    ("Charles Leclerc", 70.063),
    ("Oscar Piastri", 70.129),
    ("Max Verstappen", 70.669),
    ("Isack Hadjar", 70.924),
    ("Fernando Alonso", 70.924),
    ("Lewis Hamilton", 70.382),
    ("Esteban Ocon", 70.942),
    ("Liam Lawson", 71.129),
    ("Alexander Albon", 71.213),
    ("Carlos Sainz", 71.362),
    ("Yuki Tsunoda", 71.415),
    ("Nico Hulkenberg", 71.596),
    ("George Russell", 71.507),
    ("Kimi Antonelli", 71.880),
    ("Gabriel Bortoleto", 71.902),
    ("Pierre Gasly", 71.994),
    ("Franco Colapinto", 72.597),
    ("Lance Stroll", 72.563),
    ("Oliver Bearman", 71.979),
];

/// Look up a driver code by full name (case-insensitive)
pub fn code_for(name: &str) -> Option<&'static str> {
    let name = name.trim();
    DRIVER_ROSTER
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Look up a full name by driver code (case-insensitive)
pub fn name_for(code: &str) -> Option<&'static str> {
    let code = code.trim();
    DRIVER_ROSTER
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(name, _)| *name)
}

/// The built-in 2025 Monaco qualifying table
pub fn monaco_2025_qualifying() -> Vec<QualifyingEntry> {
    MONACO_2025_QUALIFYING
        .iter()
        .filter_map(|(name, time)| {
            code_for(name).map(|code| QualifyingEntry {
                driver_name: (*name).to_string(),
                driver_code: code.to_string(),
                qualifying_time_s: *time,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_roster_is_bijection() {
        let names: HashSet<_> = DRIVER_ROSTER.iter().map(|(n, _)| *n).collect();
        let codes: HashSet<_> = DRIVER_ROSTER.iter().map(|(_, c)| *c).collect();
        assert_eq!(names.len(), 20);
        assert_eq!(codes.len(), 20);

        for (name, code) in DRIVER_ROSTER {
            assert_eq!(code.len(), 3);
            assert!(code.chars().all(|c| c.is_ascii_uppercase()));
            assert_eq!(code_for(name), Some(code));
            assert_eq!(name_for(code), Some(name));
        }
    }

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(code_for("charles leclerc"), Some("LEC"));
        assert_eq!(name_for("lec"), Some("Charles Leclerc"));
        assert_eq!(code_for("Ayrton Senna"), None);
        assert_eq!(name_for("SEN"), None);
    }

    #[test]
    fn test_monaco_qualifying_complete() {
        let table = monaco_2025_qualifying();
        assert_eq!(table.len(), 20);
        assert_eq!(table[0].driver_code, "NOR");
        assert!((table[0].qualifying_time_s - 69.954).abs() < 1e-9);
        assert_eq!(table[13].driver_code, "RUS");
        assert!(table.iter().all(|e| e.qualifying_time_s > 60.0));
    }
}
