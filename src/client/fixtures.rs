//! Test fixtures and builders for timing data
//!
//! Provides builder patterns for creating test data with sensible defaults.
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};

use crate::models::{Compound, LapRecord, ResultRow};
use crate::session::{CalendarEvent, SessionId, SessionType};

// ============================================================================
// Calendar
// ============================================================================

/// A slice of the 2024 calendar, including a sprint weekend.
pub fn calendar_2024() -> Vec<CalendarEvent> {
    let standard = vec![
        SessionType::Practice1,
        SessionType::Practice2,
        SessionType::Practice3,
        SessionType::Qualifying,
        SessionType::Race,
    ];
    let sprint = vec![
        SessionType::Practice1,
        SessionType::Sprint,
        SessionType::Qualifying,
        SessionType::Race,
    ];

    let event = |round: u32, name: &str, location: &str, country: &str, sessions: &[SessionType]| {
        CalendarEvent {
            year: 2024,
            round,
            name: name.to_string(),
            location: Some(location.to_string()),
            country: Some(country.to_string()),
            sessions: sessions.to_vec(),
        }
    };

    vec![
        event(1, "Bahrain Grand Prix", "Sakhir", "Bahrain", &standard),
        event(2, "Saudi Arabian Grand Prix", "Jeddah", "Saudi Arabia", &standard),
        event(5, "Chinese Grand Prix", "Shanghai", "China", &sprint),
        event(8, "Monaco Grand Prix", "Monaco", "Monaco", &standard),
        event(21, "São Paulo Grand Prix", "São Paulo", "Brazil", &sprint),
    ]
}

/// Schedule response body matching [`calendar_2024`].
pub fn schedule_body_2024() -> String {
    let events: Vec<Value> = calendar_2024()
        .iter()
        .map(|e| {
            json!({
                "round": e.round,
                "name": e.name,
                "location": e.location,
                "country": e.country,
                "sessions": e.sessions.iter().map(|s| s.code()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "events": events }).to_string()
}

/// Identifier for a 2024 session from [`calendar_2024`].
pub fn session_id(round: u32, session_type: SessionType) -> SessionId {
    let calendar = calendar_2024();
    let event = calendar
        .iter()
        .find(|e| e.round == round)
        .unwrap_or_else(|| panic!("round {round} not in fixture calendar"));
    SessionId::new(2024, event, session_type)
}

// ============================================================================
// LapBuilder
// ============================================================================

/// Builder for creating test LapRecord instances.
///
/// # Example
/// ```ignore
/// let lap = LapBuilder::new("VER", 12)
///     .time(Duration::from_millis(92_345))
///     .compound(Compound::Hard)
///     .stint(2)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct LapBuilder {
    lap: LapRecord,
}

impl LapBuilder {
    /// Create a new builder for an untimed lap without tire data.
    pub fn new(driver: impl Into<String>, lap_number: u32) -> Self {
        Self {
            lap: LapRecord {
                driver: driver.into(),
                lap_number,
                lap_time: None,
                compound: None,
                tyre_life: None,
                stint: None,
                pit_in: false,
                pit_out: false,
                position: None,
            },
        }
    }

    pub fn time(mut self, time: Duration) -> Self {
        self.lap.lap_time = Some(time);
        self
    }

    pub fn compound(mut self, compound: Compound) -> Self {
        self.lap.compound = Some(compound);
        self
    }

    pub fn stint(mut self, stint: u32) -> Self {
        self.lap.stint = Some(stint);
        self
    }

    pub fn tyre_life(mut self, laps: u32) -> Self {
        self.lap.tyre_life = Some(laps);
        self
    }

    pub fn pit_in(mut self, pit_in: bool) -> Self {
        self.lap.pit_in = pit_in;
        self
    }

    pub fn pit_out(mut self, pit_out: bool) -> Self {
        self.lap.pit_out = pit_out;
        self
    }

    pub fn position(mut self, position: u32) -> Self {
        self.lap.position = Some(position);
        self
    }

    /// Build the LapRecord.
    pub fn build(self) -> LapRecord {
        self.lap
    }
}

/// Shorthand for a lap that only carries tire data.
pub fn lap(
    driver: &str,
    lap_number: u32,
    compound: Option<Compound>,
    stint: Option<u32>,
) -> LapRecord {
    let mut builder = LapBuilder::new(driver, lap_number);
    if let Some(compound) = compound {
        builder = builder.compound(compound);
    }
    if let Some(stint) = stint {
        builder = builder.stint(stint);
    }
    builder.build()
}

pub fn result_row(driver: &str, position: Option<u32>, team: &str) -> ResultRow {
    ResultRow {
        driver: driver.to_string(),
        driver_number: None,
        full_name: None,
        team: Some(team.to_string()),
        position,
        grid_position: None,
        status: Some("Finished".to_string()),
        points: None,
    }
}

// ============================================================================
// Raw payloads
// ============================================================================

/// Laps in [`race_payload_v2`]
pub const V2_RACE_LAPS: u32 = 20;

/// A 20-lap race in the current schema.
///
/// - VER: medium to hard at lap 12, safety car on laps 5-7
/// - LEC: soft to hard at lap 9
/// - HAM: no tire data at all
/// - ALO: one medium stint, retires after lap 14
pub fn race_payload_v2() -> Value {
    let mut laps = Vec::new();
    for n in 1..=V2_RACE_LAPS {
        let sc = (5..=7).contains(&n);
        let base = if sc { 128.0 } else { 92.0 };

        let (ver_stint, ver_compound) = if n < 12 { (1, "MEDIUM") } else { (2, "HARD") };
        laps.push(json!({
            "Driver": "VER", "DriverNumber": "1", "LapNumber": n as f64,
            "LapTime": base + 0.123, "Compound": ver_compound, "Stint": ver_stint as f64,
            "TyreLife": (if n < 12 { n } else { n - 11 }) as f64,
            "PitInTime": (if n == 11 { json!("0 days 00:18:02.100000") } else { json!(null) }),
            "PitOutTime": (if n == 12 { json!("0 days 00:18:25.400000") } else { json!("NaT") }),
            "Position": 1.0,
        }));

        let (lec_stint, lec_compound) = if n < 9 { (1, "SOFT") } else { (2, "HARD") };
        laps.push(json!({
            "Driver": "LEC", "DriverNumber": "16", "LapNumber": n,
            "LapTime": timedelta(base + 0.456),
            "Compound": lec_compound, "Stint": lec_stint, "TyreLife": n,
            "PitInTime": null, "PitOutTime": null, "Position": 2,
        }));

        laps.push(json!({
            "Driver": "HAM", "DriverNumber": "44", "LapNumber": n,
            "LapTime": base + 0.9, "Compound": "", "Stint": "NaN", "TyreLife": "NaN",
            "PitInTime": null, "PitOutTime": null, "Position": 3,
        }));

        if n <= 14 {
            laps.push(json!({
                "Driver": "ALO", "DriverNumber": "14", "LapNumber": n,
                "LapTime": (if n == 14 { json!(null) } else { json!(base + 1.2) }),
                "Compound": "MEDIUM", "Stint": 1, "TyreLife": n,
                "PitInTime": null, "PitOutTime": null, "Position": 4,
            }));
        }
    }

    json!({
        "results": [
            {"Abbreviation": "VER", "DriverNumber": "1", "FullName": "Max Verstappen",
             "TeamName": "Red Bull Racing", "Position": 1.0, "GridPosition": 1.0,
             "Status": "Finished", "Points": 25.0},
            {"Abbreviation": "LEC", "DriverNumber": "16", "FullName": "Charles Leclerc",
             "TeamName": "Ferrari", "Position": 2.0, "GridPosition": 3.0,
             "Status": "Finished", "Points": 18.0},
            {"Abbreviation": "HAM", "DriverNumber": "44", "FullName": "Lewis Hamilton",
             "TeamName": "Mercedes", "Position": 3.0, "GridPosition": 2.0,
             "Status": "Finished", "Points": 15.0},
            {"Abbreviation": "ALO", "DriverNumber": "14", "FullName": "Fernando Alonso",
             "TeamName": "Aston Martin", "Position": 4.0, "GridPosition": 4.0,
             "Status": "Retired", "Points": 0.0},
        ],
        "laps": laps,
        "weather": [
            {"Time": "0 days 00:00:30", "AirTemp": 24.0, "TrackTemp": 38.0,
             "WindSpeed": 2.0, "Rainfall": false},
            {"Time": "0 days 00:10:30", "AirTemp": 25.0, "TrackTemp": 40.0,
             "WindSpeed": 3.0, "Rainfall": false},
        ],
    })
}

/// Format seconds the way pandas prints a timedelta.
fn timedelta(secs: f64) -> String {
    format!("0 days 00:{:02}:{:06.3}", (secs / 60.0) as u32, secs % 60.0)
}

/// A 10-lap session in the archive schema. RAI changes soft to medium at lap 6.
pub fn race_payload_v1() -> Value {
    let mut lap_times = Vec::new();
    for n in 1..=10u32 {
        let (stint, tyre) = if n < 6 { (1, "soft") } else { (2, "Medium") };
        lap_times.push(json!({
            "driver_id": "RAI", "lap": n, "time_ms": 81_000 + n * 10, "tyre": tyre,
            "tyre_age": (if n < 6 { n - 1 } else { n - 6 }), "stint": stint,
            "pit_in": n == 5, "pit_out": n == 6, "position": 1,
        }));
        lap_times.push(json!({
            "driver_id": "BOT", "lap": n, "time_ms": 81_500 + n * 10, "tyre": "soft",
            "tyre_age": n - 1, "stint": 1, "pit_in": false, "pit_out": false, "position": 2,
        }));
    }

    json!({
        "classification": [
            {"driver_id": "RAI", "number": 7, "name": "Kimi Räikkönen", "team": "Ferrari",
             "position": 1, "grid": 2, "status": "Finished", "points": 25},
            {"driver_id": "BOT", "number": 77, "name": "Valtteri Bottas", "team": "Mercedes",
             "position": 2, "grid": 1, "status": "Finished", "points": 18},
        ],
        "lap_times": lap_times,
        "qualifying": [],
        "weather_samples": [
            {"session_time_s": 0, "air_temp": 18.0, "track_temp": 26.0, "wind_kph": 7.2, "rain": false},
            {"session_time_s": 600, "air_temp": 18.5, "track_temp": 27.0, "wind_kph": "nan", "rain": true},
        ],
    })
}
