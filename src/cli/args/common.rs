//! Common CLI types shared across commands

use clap::Args;

use crate::session::{EventRef, SessionType};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    Pretty,
    /// Table format - machine-parseable, one row per entry (global default)
    #[default]
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

impl OutputFormat {
    /// Parse a format name from the config file, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as clap::ValueEnum>::from_str(name, true).ok()
    }
}

/// Which session to load
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Season year (2018 onwards)
    pub year: i32,

    /// Event name, location, country or round number (e.g. "monaco", 8)
    pub event: EventRef,

    /// Session: fp1, fp2, fp3, q, s or r
    #[arg(short, long, default_value = "race", hide_possible_values = true)]
    pub session: SessionType,

    /// Only show these drivers (comma-separated abbreviations)
    #[arg(long, value_delimiter = ',')]
    pub driver: Vec<String>,
}

impl SessionArgs {
    /// Whether `driver` passes the --driver filter.
    pub fn includes(&self, driver: &str) -> bool {
        self.driver.is_empty() || self.driver.iter().any(|d| d.eq_ignore_ascii_case(driver))
    }
}
