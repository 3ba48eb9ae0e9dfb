//! Analyses over normalized session data
//!
//! Everything here is a pure function of [`SessionData`](crate::models::SessionData)
//! and is recomputed on every load; nothing is cached.

pub mod pace;
pub mod stints;
pub mod strategy;
pub mod summary;

pub use pace::{DriverPace, driver_pace};
pub use stints::{PitStop, Stint, StintHint, hints_from_laps, pit_stops, segment};
pub use strategy::{StrategySummary, strategy_summary};
pub use summary::{RaceSummary, summarize};
