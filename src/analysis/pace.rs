//! Representative race pace
//!
//! Only quick laps count: timed laps that neither start nor end in the pit
//! lane and are within 107% of the session's fastest such lap. Slower laps
//! are usually incidents or neutralized running.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::models::{LapRecord, SessionData};

/// Quick-lap cutoff relative to the fastest lap of the session
pub const QUICK_LAP_THRESHOLD: f64 = 1.07;

/// Pace figures for one driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPace {
    pub driver: String,
    pub best_lap_ms: u64,
    /// Mean of the driver's quick laps
    pub average_lap_ms: u64,
    pub quick_laps: usize,
    /// Best lap of the matching qualifying session
    pub quali_best_ms: Option<u64>,
    /// Race average minus qualifying best; smaller means less pace lost
    pub quali_delta_ms: Option<i64>,
    pub grid_position: Option<u32>,
    pub finish_position: Option<u32>,
    /// Grid minus finish; positive means places gained
    pub positions_gained: Option<i64>,
}

/// Timed green-flag laps within 107% of the session's fastest one.
pub fn quick_laps(laps: &[LapRecord]) -> Vec<&LapRecord> {
    let timed: Vec<&LapRecord> = laps
        .iter()
        .filter(|lap| lap.lap_time.is_some() && !lap.pit_in && !lap.pit_out)
        .collect();
    let Some(fastest) = timed.iter().filter_map(|lap| lap.lap_time).min() else {
        return Vec::new();
    };
    let cutoff = fastest.mul_f64(QUICK_LAP_THRESHOLD);

    timed
        .into_iter()
        .filter(|lap| lap.lap_time.is_some_and(|t| t <= cutoff))
        .collect()
}

/// Best qualifying time per driver.
///
/// Segment times (Q1/Q2/Q3) win; drivers without any fall back to their
/// fastest quick lap of the session.
pub fn qualifying_best(data: &SessionData) -> HashMap<String, Duration> {
    let mut best: HashMap<String, Duration> = HashMap::new();
    for lap in quick_laps(&data.laps) {
        let Some(time) = lap.lap_time else { continue };
        best.entry(lap.driver.clone())
            .and_modify(|b| *b = (*b).min(time))
            .or_insert(time);
    }

    for row in &data.qualifying {
        if let Some(segment) = [row.q1, row.q2, row.q3].into_iter().flatten().min() {
            best.insert(row.driver.clone(), segment);
        }
    }
    best
}

/// Per-driver pace over quick laps.
///
/// With a qualifying session, drivers are ordered by how little pace they
/// lost against their qualifying best; drivers without a qualifying time
/// follow. Otherwise the fastest average comes first.
pub fn driver_pace(data: &SessionData, qualifying: Option<&SessionData>) -> Vec<DriverPace> {
    let quali = qualifying.map(qualifying_best).unwrap_or_default();

    let mut order: Vec<&str> = Vec::new();
    let mut times: HashMap<&str, Vec<Duration>> = HashMap::new();
    for lap in quick_laps(&data.laps) {
        let Some(time) = lap.lap_time else { continue };
        times
            .entry(lap.driver.as_str())
            .or_insert_with(|| {
                order.push(lap.driver.as_str());
                Vec::new()
            })
            .push(time);
    }

    let mut pace: Vec<DriverPace> = order
        .into_iter()
        .filter_map(|driver| {
            let laps = times.get(driver)?;
            let best = laps.iter().min()?;
            let total: Duration = laps.iter().sum();
            let average = total / laps.len() as u32;
            let average_ms = average.as_millis() as u64;

            let quali_best_ms = quali.get(driver).map(|q| q.as_millis() as u64);

            let result = data.results.iter().find(|r| r.driver == driver);
            let grid = result.and_then(|r| r.grid_position).filter(|g| *g > 0);
            let finish = result.and_then(|r| r.position);

            Some(DriverPace {
                driver: driver.to_string(),
                best_lap_ms: best.as_millis() as u64,
                average_lap_ms: average_ms,
                quick_laps: laps.len(),
                quali_best_ms,
                quali_delta_ms: quali_best_ms.map(|q| average_ms as i64 - q as i64),
                grid_position: grid,
                finish_position: finish,
                positions_gained: grid.zip(finish).map(|(g, f)| g as i64 - f as i64),
            })
        })
        .collect();

    pace.sort_by_key(|p| {
        (
            p.quali_delta_ms.is_none(),
            p.quali_delta_ms,
            p.average_lap_ms,
            p.best_lap_ms,
        )
    });
    pace
}
