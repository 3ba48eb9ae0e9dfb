//! Tire stint segmentation
//!
//! Stint boundaries come only from provider-reported stint indices and
//! compound changes. Lap times are never consulted: slow laps under a safety
//! car or in changing weather look like pit stops to a timing heuristic but
//! are not.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{Compound, LapRecord};

/// Provider-reported stint information for one lap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StintHint {
    pub driver: String,
    pub lap_number: u32,
    pub stint: Option<u32>,
    pub compound: Option<Compound>,
}

/// A continuous run on one set of tires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stint {
    pub driver: String,
    /// 1-based, sequential per driver
    pub stint_number: u32,
    pub start_lap: u32,
    /// `None` when the driver stopped before the session's last lap
    pub end_lap: Option<u32>,
    pub compound: Option<Compound>,
    pub tyre_age_at_start: Option<u32>,
    /// Laps recorded within this stint
    pub lap_count: u32,
}

/// Tire change between two consecutive stints of one driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitStop {
    pub driver: String,
    /// First lap of the new stint
    pub lap: u32,
    pub from_stint: u32,
    pub to_stint: u32,
    pub from_compound: Option<Compound>,
    pub to_compound: Option<Compound>,
}

/// Extract stint hints from laps that carry a stint index or a known compound.
pub fn hints_from_laps(laps: &[LapRecord]) -> Vec<StintHint> {
    laps.iter()
        .filter_map(|lap| {
            let compound = lap.compound.filter(|c| *c != Compound::Unknown);
            if lap.stint.is_none() && compound.is_none() {
                return None;
            }
            Some(StintHint {
                driver: lap.driver.clone(),
                lap_number: lap.lap_number,
                stint: lap.stint,
                compound,
            })
        })
        .collect()
}

/// Derive stints per driver, in first-appearance driver order.
///
/// Each driver's laps are walked in lap-number order. A repeated lap number
/// keeps its first occurrence. A driver with no hint on any kept lap yields
/// no stints.
pub fn segment(laps: &[LapRecord], hints: &[StintHint]) -> Vec<Stint> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_driver: HashMap<&str, Vec<&LapRecord>> = HashMap::new();

    for lap in laps {
        by_driver
            .entry(lap.driver.as_str())
            .or_insert_with(|| {
                order.push(lap.driver.as_str());
                Vec::new()
            })
            .push(lap);
    }

    for kept in by_driver.values_mut() {
        kept.sort_by_key(|lap| lap.lap_number);
        kept.dedup_by(|dup, first| {
            let repeated = dup.lap_number == first.lap_number;
            if repeated {
                log::debug!("Dropping repeated lap {} for {}", dup.lap_number, dup.driver);
            }
            repeated
        });
    }

    let session_last = by_driver
        .values()
        .filter_map(|kept| kept.last().map(|lap| lap.lap_number))
        .max();

    let mut hint_index: HashMap<(&str, u32), &StintHint> = HashMap::new();
    for hint in hints {
        hint_index
            .entry((hint.driver.as_str(), hint.lap_number))
            .or_insert(hint);
    }

    let mut stints = Vec::new();
    for driver in order {
        let kept = &by_driver[driver];
        let driver_stints = segment_driver(driver, kept, &hint_index, session_last);
        if driver_stints.is_empty() {
            log::debug!("No stint data for {}; reporting no stints", driver);
        }
        stints.extend(driver_stints);
    }
    stints
}

fn segment_driver(
    driver: &str,
    laps: &[&LapRecord],
    hints: &HashMap<(&str, u32), &StintHint>,
    session_last: Option<u32>,
) -> Vec<Stint> {
    let Some(first) = laps.first() else {
        return Vec::new();
    };
    if !laps.iter().any(|lap| hints.contains_key(&(driver, lap.lap_number))) {
        return Vec::new();
    }

    let mut stints: Vec<Stint> = Vec::new();
    let mut current = open_stint(driver, 1, first);
    let mut last_hint: Option<&StintHint> = None;

    for lap in laps {
        if let Some(hint) = hints.get(&(driver, lap.lap_number)).copied() {
            let changed = last_hint.is_some_and(|prev| is_boundary(prev, hint));
            if changed && lap.lap_number > current.start_lap {
                let next = open_stint(driver, current.stint_number + 1, lap);
                current.end_lap = Some(lap.lap_number - 1);
                stints.push(std::mem::replace(&mut current, next));
            }
            if current.compound.is_none() {
                current.compound = hint.compound;
            }
            last_hint = Some(hint);
        }
        current.lap_count += 1;
    }

    let driver_last = laps.last().map(|lap| lap.lap_number);
    current.end_lap = driver_last.filter(|last| Some(*last) == session_last);
    stints.push(current);
    stints
}

fn open_stint(driver: &str, stint_number: u32, lap: &LapRecord) -> Stint {
    Stint {
        driver: driver.to_string(),
        stint_number,
        start_lap: lap.lap_number,
        end_lap: None,
        compound: None,
        tyre_age_at_start: lap.tyre_life,
        lap_count: 0,
    }
}

/// A hint starts a new stint when its stint index or compound differs from the
/// previous hint. Fields missing on either side never signal a change.
fn is_boundary(prev: &StintHint, hint: &StintHint) -> bool {
    let stint_changed = matches!((prev.stint, hint.stint), (Some(a), Some(b)) if a != b);
    let compound_changed = matches!((prev.compound, hint.compound), (Some(a), Some(b)) if a != b);
    stint_changed || compound_changed
}

/// One pit stop per pair of consecutive stints of the same driver.
pub fn pit_stops(stints: &[Stint]) -> Vec<PitStop> {
    stints
        .windows(2)
        .filter(|pair| pair[0].driver == pair[1].driver)
        .map(|pair| PitStop {
            driver: pair[1].driver.clone(),
            lap: pair[1].start_lap,
            from_stint: pair[0].stint_number,
            to_stint: pair[1].stint_number,
            from_compound: pair[0].compound,
            to_compound: pair[1].compound,
        })
        .collect()
}

/// Drivers that have laps but no stints.
pub fn drivers_without_stints(laps: &[LapRecord], stints: &[Stint]) -> Vec<String> {
    let with_stints: HashSet<&str> = stints.iter().map(|s| s.driver.as_str()).collect();
    let mut seen = HashSet::new();
    laps.iter()
        .map(|lap| lap.driver.as_str())
        .filter(|d| !with_stints.contains(d) && seen.insert(*d))
        .map(str::to_string)
        .collect()
}
