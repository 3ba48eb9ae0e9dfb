//! Race summary: the headline facts of a session

use std::time::Duration;

use serde::Serialize;

use super::stints::PitStop;
use crate::models::{SessionData, WeatherSample};

/// Kilometres per hour in one metre per second
const KPH_PER_MPS: f64 = 3.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finisher {
    pub position: u32,
    pub driver: String,
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastestLap {
    pub driver: String,
    pub lap_number: u32,
    pub lap_time_ms: u64,
}

impl FastestLap {
    pub fn lap_time(&self) -> Duration {
        Duration::from_millis(self.lap_time_ms)
    }
}

/// Weather averaged over the session. Wind is reported in km/h.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub samples: usize,
    pub avg_air_temp: Option<f64>,
    pub avg_track_temp: Option<f64>,
    pub avg_wind_kph: Option<f64>,
    pub rainfall: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSummary {
    pub winner: Option<Finisher>,
    pub podium: Vec<Finisher>,
    pub fastest_lap: Option<FastestLap>,
    pub total_laps: Option<u32>,
    pub weather: Option<WeatherSummary>,
    pub pit_stops: usize,
}

pub fn summarize(data: &SessionData, pit_stops: &[PitStop]) -> RaceSummary {
    let mut podium: Vec<Finisher> = data
        .results
        .iter()
        .filter_map(|row| {
            let position = row.position.filter(|p| (1..=3).contains(p))?;
            Some(Finisher {
                position,
                driver: row.driver.clone(),
                team: row.team.clone(),
            })
        })
        .collect();
    podium.sort_by_key(|f| f.position);

    let winner = podium.iter().find(|f| f.position == 1).cloned();

    let fastest_lap = data
        .laps
        .iter()
        .filter_map(|lap| lap.lap_time.map(|t| (lap, t)))
        .min_by_key(|(lap, t)| (*t, lap.lap_number))
        .map(|(lap, t)| FastestLap {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
            lap_time_ms: t.as_millis() as u64,
        });

    RaceSummary {
        winner,
        podium,
        fastest_lap,
        total_laps: data.last_lap(),
        weather: summarize_weather(&data.weather),
        pit_stops: pit_stops.len(),
    }
}

fn summarize_weather(samples: &[WeatherSample]) -> Option<WeatherSummary> {
    if samples.is_empty() {
        return None;
    }

    Some(WeatherSummary {
        samples: samples.len(),
        avg_air_temp: mean(samples.iter().filter_map(|s| s.air_temp)),
        avg_track_temp: mean(samples.iter().filter_map(|s| s.track_temp)),
        avg_wind_kph: mean(samples.iter().filter_map(|s| s.wind_speed))
            .map(|mps| (mps * KPH_PER_MPS * 10.0).round() / 10.0),
        rainfall: samples.iter().any(|s| s.rainfall == Some(true)),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{LapBuilder, result_row};

    fn sample(air: Option<f64>, wind: Option<f64>, rain: Option<bool>) -> WeatherSample {
        WeatherSample {
            session_time: None,
            air_temp: air,
            track_temp: air.map(|a| a + 15.0),
            wind_speed: wind,
            rainfall: rain,
        }
    }

    #[test]
    fn test_summary_podium_and_winner() {
        let data = SessionData {
            results: vec![
                result_row("NOR", Some(2), "McLaren"),
                result_row("VER", Some(1), "Red Bull Racing"),
                result_row("LEC", Some(3), "Ferrari"),
                result_row("SAR", None, "Williams"),
                result_row("PIA", Some(4), "McLaren"),
            ],
            ..Default::default()
        };

        let summary = summarize(&data, &[]);
        let winner = summary.winner.unwrap();
        assert_eq!(winner.driver, "VER");
        assert_eq!(winner.team.as_deref(), Some("Red Bull Racing"));

        let podium: Vec<&str> = summary.podium.iter().map(|f| f.driver.as_str()).collect();
        assert_eq!(podium, vec!["VER", "NOR", "LEC"]);
    }

    #[test]
    fn test_summary_fastest_lap_ignores_untimed_laps() {
        let data = SessionData {
            laps: vec![
                LapBuilder::new("VER", 1).build(),
                LapBuilder::new("VER", 2).time(Duration::from_millis(93_100)).build(),
                LapBuilder::new("HAM", 2).time(Duration::from_millis(92_950)).build(),
                LapBuilder::new("HAM", 3).time(Duration::from_millis(94_000)).build(),
            ],
            ..Default::default()
        };

        let summary = summarize(&data, &[]);
        let fastest = summary.fastest_lap.unwrap();
        assert_eq!(fastest.driver, "HAM");
        assert_eq!(fastest.lap_number, 2);
        assert_eq!(fastest.lap_time(), Duration::from_millis(92_950));
        assert_eq!(summary.total_laps, Some(3));
    }

    #[test]
    fn test_summary_weather_averages_in_kph() {
        let data = SessionData {
            weather: vec![
                sample(Some(20.0), Some(2.0), Some(false)),
                sample(Some(22.0), Some(3.0), Some(true)),
                sample(None, None, None),
            ],
            ..Default::default()
        };

        let weather = summarize(&data, &[]).weather.unwrap();
        assert_eq!(weather.samples, 3);
        assert_eq!(weather.avg_air_temp, Some(21.0));
        assert_eq!(weather.avg_track_temp, Some(36.0));
        assert_eq!(weather.avg_wind_kph, Some(9.0));
        assert!(weather.rainfall);
    }

    #[test]
    fn test_summary_of_empty_session() {
        let summary = summarize(&SessionData::default(), &[]);
        assert!(summary.winner.is_none());
        assert!(summary.podium.is_empty());
        assert!(summary.fastest_lap.is_none());
        assert!(summary.weather.is_none());
        assert_eq!(summary.total_laps, None);
        assert_eq!(summary.pit_stops, 0);
    }
}
