//! Field-wide pit strategy patterns

use std::collections::BTreeMap;

use serde::Serialize;

use super::stints::{PitStop, Stint};

/// Stop count for one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverStops {
    pub driver: String,
    pub stops: usize,
}

/// The lap most drivers pitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitWindow {
    pub lap: u32,
    pub drivers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategySummary {
    /// Drivers with tire data, in stint order
    pub stops_per_driver: Vec<DriverStops>,
    pub one_stop: usize,
    pub two_stop: usize,
    pub main_window: Option<PitWindow>,
}

impl StrategySummary {
    pub fn drivers(&self) -> usize {
        self.stops_per_driver.len()
    }
}

/// Summarize stops per driver and the busiest pit lap.
///
/// A driver's stop count is their stint count minus one, so drivers who
/// never pitted still appear with zero stops. Ties for the main window go
/// to the earliest lap.
pub fn strategy_summary(stints: &[&Stint], stops: &[&PitStop]) -> StrategySummary {
    let mut stops_per_driver: Vec<DriverStops> = Vec::new();
    for stint in stints {
        match stops_per_driver.iter_mut().find(|d| d.driver == stint.driver) {
            Some(entry) => entry.stops += 1,
            None => stops_per_driver.push(DriverStops {
                driver: stint.driver.clone(),
                stops: 0,
            }),
        }
    }

    let mut by_lap: BTreeMap<u32, usize> = BTreeMap::new();
    for stop in stops {
        *by_lap.entry(stop.lap).or_default() += 1;
    }
    let main_window = by_lap
        .into_iter()
        .fold(None, |best: Option<PitWindow>, (lap, drivers)| match best {
            Some(b) if b.drivers >= drivers => Some(b),
            _ => Some(PitWindow { lap, drivers }),
        });

    StrategySummary {
        one_stop: stops_per_driver.iter().filter(|d| d.stops == 1).count(),
        two_stop: stops_per_driver.iter().filter(|d| d.stops == 2).count(),
        stops_per_driver,
        main_window,
    }
}
