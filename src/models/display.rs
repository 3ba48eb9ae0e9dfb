//! Display model implementations for table output
//!
//! Display models turn analysis results into CLI-friendly rows with
//! appropriate column names. JSON output serializes the analysis types
//! directly.

use tabled::Tabled;

use crate::analysis::summary::Finisher;
use crate::analysis::{DriverPace, PitStop, Stint};
use crate::output::formatters::{format_delta, format_gap_millis, format_lap_millis, or_dash};

/// Stint display model for table output.
#[derive(Debug, Clone, Tabled)]
pub struct StintDisplay {
    #[tabled(rename = "DRIVER")]
    pub driver: String,

    #[tabled(rename = "STINT")]
    pub stint: u32,

    #[tabled(rename = "COMPOUND")]
    pub compound: String,

    /// Lap range, open-ended for drivers who did not finish
    #[tabled(rename = "LAPS")]
    pub laps: String,

    #[tabled(rename = "COUNT")]
    pub lap_count: u32,

    #[tabled(rename = "TYRE AGE")]
    pub tyre_age: String,
}

impl From<&Stint> for StintDisplay {
    fn from(stint: &Stint) -> Self {
        let laps = match stint.end_lap {
            Some(end) => format!("{}-{}", stint.start_lap, end),
            None => format!("{}-", stint.start_lap),
        };
        Self {
            driver: stint.driver.clone(),
            stint: stint.stint_number,
            compound: or_dash(stint.compound),
            laps,
            lap_count: stint.lap_count,
            tyre_age: or_dash(stint.tyre_age_at_start),
        }
    }
}

/// Pit stop display model for table output.
#[derive(Debug, Clone, Tabled)]
pub struct PitStopDisplay {
    #[tabled(rename = "DRIVER")]
    pub driver: String,

    #[tabled(rename = "LAP")]
    pub lap: u32,

    #[tabled(rename = "FROM")]
    pub from: String,

    #[tabled(rename = "TO")]
    pub to: String,
}

impl From<&PitStop> for PitStopDisplay {
    fn from(stop: &PitStop) -> Self {
        Self {
            driver: stop.driver.clone(),
            lap: stop.lap,
            from: or_dash(stop.from_compound),
            to: or_dash(stop.to_compound),
        }
    }
}

/// Podium row for the race summary.
#[derive(Debug, Clone, Tabled)]
pub struct FinisherDisplay {
    #[tabled(rename = "POS")]
    pub position: u32,

    #[tabled(rename = "DRIVER")]
    pub driver: String,

    #[tabled(rename = "TEAM")]
    pub team: String,
}

impl From<&Finisher> for FinisherDisplay {
    fn from(finisher: &Finisher) -> Self {
        Self {
            position: finisher.position,
            driver: finisher.driver.clone(),
            team: finisher.team.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Race pace display model for table output.
#[derive(Debug, Clone, Tabled)]
pub struct PaceDisplay {
    #[tabled(rename = "DRIVER")]
    pub driver: String,

    #[tabled(rename = "BEST")]
    pub best: String,

    #[tabled(rename = "AVERAGE")]
    pub average: String,

    #[tabled(rename = "QUICK LAPS")]
    pub quick_laps: usize,

    #[tabled(rename = "QUALI")]
    pub quali: String,

    /// Race average against qualifying best
    #[tabled(rename = "Q DELTA")]
    pub quali_delta: String,

    #[tabled(rename = "GRID")]
    pub grid: String,

    #[tabled(rename = "FINISH")]
    pub finish: String,

    #[tabled(rename = "+/-")]
    pub gained: String,
}

impl From<&DriverPace> for PaceDisplay {
    fn from(pace: &DriverPace) -> Self {
        Self {
            driver: pace.driver.clone(),
            best: format_lap_millis(pace.best_lap_ms),
            average: format_lap_millis(pace.average_lap_ms),
            quick_laps: pace.quick_laps,
            quali: pace
                .quali_best_ms
                .map(format_lap_millis)
                .unwrap_or_else(|| "-".to_string()),
            quali_delta: format_gap_millis(pace.quali_delta_ms),
            grid: or_dash(pace.grid_position),
            finish: or_dash(pace.finish_position),
            gained: format_delta(pace.positions_gained),
        }
    }
}
