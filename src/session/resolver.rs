//! Event calendar matching

use serde::{Deserialize, Serialize};

use super::{EventRef, SessionId, SessionType, fold_name};
use crate::error::{Error, Result};

/// Earliest season with the timing detail this tool relies on
pub const FIRST_SUPPORTED_YEAR: i32 = 2018;

/// One event on a season calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub year: i32,
    pub round: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Sessions held at this event. Empty when the provider does not say.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sessions: Vec<SessionType>,
}

/// Reject years outside `FIRST_SUPPORTED_YEAR..=current_year`.
pub fn validate_year(year: i32, current_year: i32) -> Result<()> {
    if year < FIRST_SUPPORTED_YEAR || year > current_year {
        return Err(Error::InvalidSession(format!(
            "year {} is outside the supported range {}-{}",
            year, FIRST_SUPPORTED_YEAR, current_year
        )));
    }
    Ok(())
}

/// Resolves user-supplied event references against one season's calendar.
pub struct SessionResolver<'a> {
    calendar: &'a [CalendarEvent],
    current_year: i32,
}

impl<'a> SessionResolver<'a> {
    pub fn new(calendar: &'a [CalendarEvent], current_year: i32) -> Self {
        Self {
            calendar,
            current_year,
        }
    }

    /// Map (year, event, session type) to a canonical [`SessionId`].
    pub fn resolve(
        &self,
        year: i32,
        event: &EventRef,
        session_type: SessionType,
    ) -> Result<SessionId> {
        validate_year(year, self.current_year)?;

        let entry = self.find_event(year, event)?;

        if !entry.sessions.is_empty() && !entry.sessions.contains(&session_type) {
            return Err(Error::InvalidSession(format!(
                "{} {} has no {} session",
                year, entry.name, session_type
            )));
        }

        Ok(SessionId::new(year, entry, session_type))
    }

    fn find_event(&self, year: i32, event: &EventRef) -> Result<&'a CalendarEvent> {
        let season: Vec<&'a CalendarEvent> =
            self.calendar.iter().filter(|e| e.year == year).collect();

        match event {
            EventRef::Round(round) => season
                .into_iter()
                .find(|e| e.round == *round)
                .ok_or_else(|| {
                    Error::InvalidSession(format!("{} has no round {}", year, round))
                }),
            EventRef::Name(name) => {
                let wanted = match_key(name);
                if wanted.is_empty() {
                    return Err(Error::InvalidSession("event name is empty".to_string()));
                }

                // Most specific field first: name, then location, then country,
                // then a substring of the name.
                let tiers: [&dyn Fn(&CalendarEvent) -> bool; 4] = [
                    &|e| match_key(&e.name) == wanted,
                    &|e| e.location.as_deref().map(match_key) == Some(wanted.clone()),
                    &|e| e.country.as_deref().map(match_key) == Some(wanted.clone()),
                    &|e| match_key(&e.name).contains(&wanted),
                ];

                for tier in tiers {
                    let matches: Vec<&'a CalendarEvent> =
                        season.iter().copied().filter(|&e| tier(e)).collect();
                    match matches.as_slice() {
                        [] => continue,
                        [single] => return Ok(*single),
                        many => return Err(ambiguous(name, year, many)),
                    }
                }

                Err(Error::InvalidSession(format!(
                    "no {} event matches '{}'",
                    year, name
                )))
            }
        }
    }
}

fn ambiguous(name: &str, year: i32, candidates: &[&CalendarEvent]) -> Error {
    Error::InvalidSession(format!(
        "'{}' is ambiguous in {}: {}",
        name,
        year,
        candidates
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

/// Case, accent and punctuation-insensitive comparison key.
fn match_key(name: &str) -> String {
    fold_name(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> Vec<CalendarEvent> {
        let mk = |round: u32, name: &str, location: &str, country: &str| CalendarEvent {
            year: 2024,
            round,
            name: name.to_string(),
            location: Some(location.to_string()),
            country: Some(country.to_string()),
            sessions: Vec::new(),
        };
        let mut events = vec![
            mk(1, "Bahrain Grand Prix", "Sakhir", "Bahrain"),
            mk(5, "Chinese Grand Prix", "Shanghai", "China"),
            mk(6, "Miami Grand Prix", "Miami", "United States"),
            mk(19, "United States Grand Prix", "Austin", "United States"),
            mk(21, "São Paulo Grand Prix", "São Paulo", "Brazil"),
        ];
        events[1].sessions = vec![
            SessionType::Practice1,
            SessionType::Sprint,
            SessionType::Qualifying,
            SessionType::Race,
        ];
        events
    }

    #[test]
    fn test_resolve_by_round() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);
        let id = resolver
            .resolve(2024, &EventRef::Round(1), SessionType::Race)
            .unwrap();
        assert_eq!(id.event_name(), "Bahrain Grand Prix");
        assert_eq!(id.round(), 1);
    }

    #[test]
    fn test_resolve_by_name_location_and_country() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        for name in ["chinese grand prix", "Shanghai", "CHINA", "chinese"] {
            let id = resolver
                .resolve(2024, &EventRef::Name(name.to_string()), SessionType::Race)
                .unwrap();
            assert_eq!(id.round(), 5, "lookup by {name}");
        }

        let id = resolver
            .resolve(2024, &EventRef::Name("sao paulo".to_string()), SessionType::Race)
            .unwrap();
        assert_eq!(id.round(), 21);
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        // "Miami" is exact on location even though it is also a substring.
        let id = resolver
            .resolve(2024, &EventRef::Name("Miami".to_string()), SessionType::Race)
            .unwrap();
        assert_eq!(id.round(), 6);
    }

    #[test]
    fn test_ambiguous_name_is_rejected() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        let err = resolver
            .resolve(2024, &EventRef::Name("grand prix".to_string()), SessionType::Race)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSession(msg) if msg.contains("ambiguous")));
    }

    #[test]
    fn test_shared_country_is_ambiguous() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        let err = resolver
            .resolve(
                2024,
                &EventRef::Name("United States".to_string()),
                SessionType::Race,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSession(msg) if msg.contains("ambiguous")));
    }

    #[test]
    fn test_year_out_of_range() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        for year in [2017, 2027] {
            let err = resolver
                .resolve(year, &EventRef::Round(1), SessionType::Race)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidSession(_)));
        }
    }

    #[test]
    fn test_unknown_event() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        assert!(resolver
            .resolve(2024, &EventRef::Round(30), SessionType::Race)
            .is_err());
        assert!(resolver
            .resolve(2024, &EventRef::Name("Monaco".to_string()), SessionType::Race)
            .is_err());
        // Calendar entries from other seasons never match.
        assert!(resolver
            .resolve(2023, &EventRef::Round(1), SessionType::Race)
            .is_err());
    }

    #[test]
    fn test_session_not_held_at_event() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);

        let err = resolver
            .resolve(2024, &EventRef::Round(5), SessionType::Practice3)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSession(msg) if msg.contains("Practice 3")));

        assert!(resolver
            .resolve(2024, &EventRef::Round(5), SessionType::Sprint)
            .is_ok());
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let cal = calendar();
        let resolver = SessionResolver::new(&cal, 2026);
        let a = resolver
            .resolve(2024, &EventRef::Name("Austin".to_string()), SessionType::Qualifying)
            .unwrap();
        let b = resolver
            .resolve(2024, &EventRef::Round(19), SessionType::Qualifying)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }
}
