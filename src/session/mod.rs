//! Session identifiers and event calendar resolution

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod resolver;

pub use resolver::{CalendarEvent, SessionResolver, validate_year};

/// Segment of a race weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Free practice 1
    #[value(alias = "fp1")]
    Practice1,
    /// Free practice 2
    #[value(alias = "fp2")]
    Practice2,
    /// Free practice 3
    #[value(alias = "fp3")]
    Practice3,
    #[value(alias = "q")]
    Qualifying,
    #[value(alias = "r")]
    Race,
    #[value(alias = "s")]
    Sprint,
}

impl SessionType {
    /// Short code used in cache keys and upstream URLs.
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Practice1 => "fp1",
            SessionType::Practice2 => "fp2",
            SessionType::Practice3 => "fp3",
            SessionType::Qualifying => "q",
            SessionType::Race => "r",
            SessionType::Sprint => "s",
        }
    }

    /// Parse a short code or a schedule label such as "Practice 1".
    pub fn from_code(code: &str) -> Option<Self> {
        let key: String = code
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "fp1" | "practice1" => Some(SessionType::Practice1),
            "fp2" | "practice2" => Some(SessionType::Practice2),
            "fp3" | "practice3" => Some(SessionType::Practice3),
            "q" | "qualifying" => Some(SessionType::Qualifying),
            "r" | "race" => Some(SessionType::Race),
            "s" | "sprint" => Some(SessionType::Sprint),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Practice1 => "Practice 1",
            SessionType::Practice2 => "Practice 2",
            SessionType::Practice3 => "Practice 3",
            SessionType::Qualifying => "Qualifying",
            SessionType::Race => "Race",
            SessionType::Sprint => "Sprint",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a caller names an event: by calendar round or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRef {
    Round(u32),
    Name(String),
}

impl FromStr for EventRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<u32>() {
            Ok(round) => EventRef::Round(round),
            Err(_) => EventRef::Name(trimmed.to_string()),
        })
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventRef::Round(round) => write!(f, "round {}", round),
            EventRef::Name(name) => f.write_str(name),
        }
    }
}

/// Canonical identifier for one session of one event.
///
/// Only [`SessionResolver`] constructs these, so every identifier refers to a
/// calendar entry that existed when it was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    year: i32,
    round: u32,
    event_name: String,
    session_type: SessionType,
}

impl SessionId {
    pub(crate) fn new(year: i32, event: &CalendarEvent, session_type: SessionType) -> Self {
        Self {
            year,
            round: event.round,
            event_name: event.name.clone(),
            session_type,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// Filesystem-safe key, e.g. `2024_05_chinese-grand-prix_r`.
    ///
    /// Year and round alone identify the event; the slug is for humans.
    pub fn canonical(&self) -> String {
        format!(
            "{}_{:02}_{}_{}",
            self.year,
            self.round,
            slug(&self.event_name),
            self.session_type.code()
        )
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {}",
            self.year, self.event_name, self.session_type
        )
    }
}

/// Lowercase ASCII fold used for both slugs and name matching.
pub(crate) fn fold_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' | 'Í' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ü' => 'u',
            'ç' | 'Ç' => 'c',
            'ñ' | 'Ñ' => 'n',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Collapse a name to `[a-z0-9-]`, joining words with single dashes.
pub(crate) fn slug(name: &str) -> String {
    let folded = fold_name(name);
    let mut out = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("event");
    }
    out
}
