//! Upstream payload normalization
//!
//! The timing provider has changed shape over the years. Each known shape is a
//! variant of [`RawSession`]; [`normalize`] maps all of them to the one schema
//! in [`crate::models`] so the cache and analysis code never see the drift.

pub mod values;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Compound, LapRecord, QualifyingRow, ResultRow, SessionData, WeatherSample};
use values::{Record, flag, float, millis, present, seconds, string, take_records, uint};

/// Kilometres per hour in one metre per second
const KPH_PER_MPS: f64 = 3.6;

/// Raw session payload, tagged by upstream schema version.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSession {
    V2(TimingV2),
    V1(TimingV1),
    /// Top-level keys of a payload no known version matches
    Unrecognized(Vec<String>),
}

/// Current timing schema: PascalCase columns, lap times in seconds or
/// timedelta strings, wind in m/s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingV2 {
    pub results: Vec<Record>,
    pub laps: Vec<Record>,
    pub weather: Vec<Record>,
}

/// Archive schema: snake_case columns, times in milliseconds, wind in km/h.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingV1 {
    pub classification: Vec<Record>,
    pub lap_times: Vec<Record>,
    pub qualifying: Vec<Record>,
    pub weather_samples: Vec<Record>,
}

impl RawSession {
    /// Detect the schema version from the top-level layout.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut top) = value else {
            return RawSession::Unrecognized(Vec::new());
        };

        if top.get("laps").is_some_and(Value::is_array) {
            RawSession::V2(TimingV2 {
                laps: take_records(&mut top, "laps"),
                results: take_records(&mut top, "results"),
                weather: take_records(&mut top, "weather"),
            })
        } else if top.get("lap_times").is_some_and(Value::is_array) {
            RawSession::V1(TimingV1 {
                lap_times: take_records(&mut top, "lap_times"),
                classification: take_records(&mut top, "classification"),
                qualifying: take_records(&mut top, "qualifying"),
                weather_samples: take_records(&mut top, "weather_samples"),
            })
        } else {
            RawSession::Unrecognized(top.keys().cloned().collect())
        }
    }
}

impl<'de> Deserialize<'de> for RawSession {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawSession::from_value)
    }
}

/// Normalize a raw payload into the internal schema.
///
/// Fails with `UnsupportedSession` when the payload shape is unknown or no lap
/// row carries both a driver and a lap number. Missing optional fields become
/// `None`.
pub fn normalize(raw: RawSession) -> Result<SessionData> {
    let data = match raw {
        RawSession::V2(v2) => normalize_v2(v2),
        RawSession::V1(v1) => normalize_v1(v1),
        RawSession::Unrecognized(keys) => {
            return Err(Error::UnsupportedSession(if keys.is_empty() {
                "payload is not a session object".to_string()
            } else {
                format!("unrecognized payload with fields: {}", keys.join(", "))
            }));
        }
    };

    if data.laps.is_empty() {
        return Err(Error::UnsupportedSession(
            "no lap rows with a driver and lap number".to_string(),
        ));
    }
    Ok(data)
}

fn normalize_v2(raw: TimingV2) -> SessionData {
    let laps = keep_laps(raw.laps.iter().map(|rec| {
        Some(LapRecord {
            driver: string(rec, "Driver").or_else(|| string(rec, "DriverNumber"))?,
            lap_number: uint(rec, "LapNumber")?,
            lap_time: seconds(rec, "LapTime"),
            compound: string(rec, "Compound").and_then(|c| Compound::parse(&c)),
            tyre_life: uint(rec, "TyreLife"),
            stint: uint(rec, "Stint"),
            pit_in: present(rec, "PitInTime"),
            pit_out: present(rec, "PitOutTime"),
            position: uint(rec, "Position"),
        })
    }));

    let results: Vec<ResultRow> = raw
        .results
        .iter()
        .filter_map(|rec| {
            Some(ResultRow {
                driver: string(rec, "Abbreviation").or_else(|| string(rec, "DriverNumber"))?,
                driver_number: string(rec, "DriverNumber"),
                full_name: string(rec, "FullName"),
                team: string(rec, "TeamName"),
                position: uint(rec, "Position"),
                grid_position: uint(rec, "GridPosition"),
                status: string(rec, "Status"),
                points: float(rec, "Points"),
            })
        })
        .collect();

    // Qualifying times ride along on the results table
    let qualifying = raw
        .results
        .iter()
        .filter(|rec| ["Q1", "Q2", "Q3"].iter().any(|q| present(rec, q)))
        .filter_map(|rec| {
            Some(QualifyingRow {
                driver: string(rec, "Abbreviation").or_else(|| string(rec, "DriverNumber"))?,
                position: uint(rec, "Position"),
                q1: seconds(rec, "Q1"),
                q2: seconds(rec, "Q2"),
                q3: seconds(rec, "Q3"),
            })
        })
        .collect();

    let weather = raw
        .weather
        .iter()
        .map(|rec| WeatherSample {
            session_time: seconds(rec, "Time"),
            air_temp: float(rec, "AirTemp"),
            track_temp: float(rec, "TrackTemp"),
            wind_speed: float(rec, "WindSpeed"),
            rainfall: flag(rec, "Rainfall"),
        })
        .collect();

    SessionData {
        results,
        laps,
        qualifying,
        weather,
    }
}

fn normalize_v1(raw: TimingV1) -> SessionData {
    let laps = keep_laps(raw.lap_times.iter().map(|rec| {
        Some(LapRecord {
            driver: string(rec, "driver_id")?,
            lap_number: uint(rec, "lap")?,
            lap_time: millis(rec, "time_ms"),
            compound: string(rec, "tyre").and_then(|c| Compound::parse(&c)),
            tyre_life: uint(rec, "tyre_age"),
            stint: uint(rec, "stint"),
            pit_in: flag(rec, "pit_in").unwrap_or(false),
            pit_out: flag(rec, "pit_out").unwrap_or(false),
            position: uint(rec, "position"),
        })
    }));

    let results = raw
        .classification
        .iter()
        .filter_map(|rec| {
            Some(ResultRow {
                driver: string(rec, "driver_id")?,
                driver_number: string(rec, "number"),
                full_name: string(rec, "name"),
                team: string(rec, "team"),
                position: uint(rec, "position"),
                grid_position: uint(rec, "grid"),
                status: string(rec, "status"),
                points: float(rec, "points"),
            })
        })
        .collect();

    let qualifying = raw
        .qualifying
        .iter()
        .filter_map(|rec| {
            Some(QualifyingRow {
                driver: string(rec, "driver_id")?,
                position: uint(rec, "position"),
                q1: millis(rec, "q1_ms"),
                q2: millis(rec, "q2_ms"),
                q3: millis(rec, "q3_ms"),
            })
        })
        .collect();

    let weather = raw
        .weather_samples
        .iter()
        .map(|rec| WeatherSample {
            session_time: seconds(rec, "session_time_s"),
            air_temp: float(rec, "air_temp"),
            track_temp: float(rec, "track_temp"),
            wind_speed: float(rec, "wind_kph").map(|kph| kph / KPH_PER_MPS),
            rainfall: flag(rec, "rain").or_else(|| flag(rec, "rainfall")),
        })
        .collect();

    SessionData {
        results,
        laps,
        qualifying,
        weather,
    }
}

/// Collect lap rows that carry the required fields and log what was dropped.
fn keep_laps(rows: impl Iterator<Item = Option<LapRecord>>) -> Vec<LapRecord> {
    let mut dropped = 0usize;
    let laps: Vec<LapRecord> = rows
        .filter_map(|lap| {
            if lap.is_none() {
                dropped += 1;
            }
            lap
        })
        .collect();

    if dropped > 0 {
        log::debug!("Dropped {} lap rows without driver or lap number", dropped);
    }
    laps
}
