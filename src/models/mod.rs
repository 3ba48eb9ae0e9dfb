//! Normalized session schema
//!
//! Every dataset the cache stores and every analysis consumes uses these
//! types, regardless of which upstream schema version produced them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod display;

/// Tire compound as reported by the timing provider.
///
/// 2018 used the extended Pirelli range; later seasons report only the
/// soft/medium/hard labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compound {
    HyperSoft,
    UltraSoft,
    SuperSoft,
    Soft,
    Medium,
    Hard,
    SuperHard,
    Intermediate,
    Wet,
    Unknown,
}

impl Compound {
    /// Parse a provider compound label. Returns `None` for empty labels.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        let compound = match normalized.as_str() {
            "" => return None,
            "HYPERSOFT" => Compound::HyperSoft,
            "ULTRASOFT" => Compound::UltraSoft,
            "SUPERSOFT" => Compound::SuperSoft,
            "SOFT" | "S" => Compound::Soft,
            "MEDIUM" | "M" => Compound::Medium,
            "HARD" | "H" => Compound::Hard,
            "SUPERHARD" => Compound::SuperHard,
            "INTERMEDIATE" | "INTER" | "I" => Compound::Intermediate,
            "WET" | "W" => Compound::Wet,
            _ => Compound::Unknown,
        };
        Some(compound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compound::HyperSoft => "HYPERSOFT",
            Compound::UltraSoft => "ULTRASOFT",
            Compound::SuperSoft => "SUPERSOFT",
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
            Compound::SuperHard => "SUPERHARD",
            Compound::Intermediate => "INTERMEDIATE",
            Compound::Wet => "WET",
            Compound::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed lap for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    /// Driver abbreviation (e.g. "VER")
    pub driver: String,

    pub lap_number: u32,

    /// Missing for laps without a representative time (yellow/red flags)
    #[serde(with = "millis")]
    pub lap_time: Option<Duration>,

    pub compound: Option<Compound>,

    /// Tire age in laps at the start of this lap
    pub tyre_life: Option<u32>,

    /// Stint index as reported by the provider
    pub stint: Option<u32>,

    pub pit_in: bool,
    pub pit_out: bool,
    pub position: Option<u32>,
}

/// Classification row for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub driver: String,
    pub driver_number: Option<String>,
    pub full_name: Option<String>,
    pub team: Option<String>,
    pub position: Option<u32>,
    pub grid_position: Option<u32>,
    pub status: Option<String>,
    pub points: Option<f64>,
}

/// Qualifying segment times for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingRow {
    pub driver: String,
    pub position: Option<u32>,
    #[serde(with = "millis")]
    pub q1: Option<Duration>,
    #[serde(with = "millis")]
    pub q2: Option<Duration>,
    #[serde(with = "millis")]
    pub q3: Option<Duration>,
}

/// Trackside weather sample. Temperatures in °C, wind speed in m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    #[serde(with = "millis")]
    pub session_time: Option<Duration>,
    pub air_temp: Option<f64>,
    pub track_temp: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rainfall: Option<bool>,
}

/// All normalized datasets for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub results: Vec<ResultRow>,
    pub laps: Vec<LapRecord>,
    pub qualifying: Vec<QualifyingRow>,
    pub weather: Vec<WeatherSample>,
}

impl SessionData {
    /// Highest lap number recorded by any driver.
    pub fn last_lap(&self) -> Option<u32> {
        self.laps.iter().map(|lap| lap.lap_number).max()
    }
}

/// Serialize optional durations as integer milliseconds.
pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
