//! Field coercion for loosely typed provider records
//!
//! Providers disagree on how to spell "no value": JSON null, empty strings,
//! and pandas leftovers such as `"NaN"`, `"NaT"` and `"None"` all occur. Every
//! accessor here treats them alike and returns `None`.

use std::time::Duration;

use serde_json::{Map, Value};

/// One row of a provider table.
pub type Record = Map<String, Value>;

const NULL_SPELLINGS: [&str; 6] = ["", "nan", "nat", "none", "null", "<na>"];

/// Whether a provider value means "missing".
pub fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            NULL_SPELLINGS.iter().any(|n| s.eq_ignore_ascii_case(n))
        }
        Value::Number(n) => n.as_f64().is_some_and(|f| !f.is_finite()),
        _ => false,
    }
}

/// Non-null value of a field.
pub fn field<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    record.get(name).filter(|v| !is_null(v))
}

pub fn present(record: &Record, name: &str) -> bool {
    field(record, name).is_some()
}

pub fn string(record: &Record, name: &str) -> Option<String> {
    match field(record, name)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn float(record: &Record, name: &str) -> Option<f64> {
    let value = match field(record, name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Non-negative whole number. Accepts `3`, `3.0` and `"3"`.
pub fn uint(record: &Record, name: &str) -> Option<u32> {
    let value = float(record, name)?;
    (value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

pub fn flag(record: &Record, name: &str) -> Option<bool> {
    match field(record, name)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Duration given as float seconds or as a timedelta string.
pub fn seconds(record: &Record, name: &str) -> Option<Duration> {
    match field(record, name)? {
        Value::String(s) => parse_timedelta(s),
        _ => float(record, name).and_then(from_secs),
    }
}

/// Duration given as integer (or float) milliseconds.
pub fn millis(record: &Record, name: &str) -> Option<Duration> {
    float(record, name).and_then(|ms| from_secs(ms / 1000.0))
}

/// Round to whole milliseconds, the precision every provider publishes.
fn from_secs(secs: f64) -> Option<Duration> {
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_millis((secs * 1000.0).round() as u64))
}

/// Parse `"0 days 00:01:32.123000"`, `"00:01:32.123"`, `"1:32.123"` or `"92.123"`.
pub fn parse_timedelta(input: &str) -> Option<Duration> {
    let input = input.trim();
    let (days, clock) = match input.split_once("days") {
        Some((days, rest)) => (days.trim().parse::<f64>().ok()?, rest.trim()),
        None => match input.split_once("day") {
            Some((days, rest)) => (days.trim().parse::<f64>().ok()?, rest.trim()),
            None => (0.0, input),
        },
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, secs) = match parts.as_slice() {
        [s] => ("0", "0", *s),
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let total = days * 86_400.0
        + hours.trim().parse::<f64>().ok()? * 3_600.0
        + minutes.trim().parse::<f64>().ok()? * 60.0
        + secs.trim().parse::<f64>().ok()?;
    from_secs(total)
}

/// Take an array of objects out of a top-level payload. Anything else yields
/// no rows.
pub fn take_records(top: &mut Record, name: &str) -> Vec<Record> {
    match top.remove(name) {
        Some(Value::Array(rows)) => rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_null_conventions() {
        let rec = record(json!({
            "a": null, "b": "", "c": "NaT", "d": "None", "e": "nan", "f": "NaN", "g": " "
        }));
        for name in ["a", "b", "c", "d", "e", "f", "g", "missing"] {
            assert!(field(&rec, name).is_none(), "{name} should be null");
            assert!(string(&rec, name).is_none());
            assert!(float(&rec, name).is_none());
        }
    }

    #[test]
    fn test_string_from_number() {
        let rec = record(json!({"n": 44, "f": 1.0, "s": " VER "}));
        assert_eq!(string(&rec, "n").as_deref(), Some("44"));
        assert_eq!(string(&rec, "f").as_deref(), Some("1"));
        assert_eq!(string(&rec, "s").as_deref(), Some("VER"));
    }

    #[test]
    fn test_uint_accepts_whole_floats_only() {
        let rec = record(json!({"a": 3, "b": 3.0, "c": "7", "d": 2.5, "e": -1}));
        assert_eq!(uint(&rec, "a"), Some(3));
        assert_eq!(uint(&rec, "b"), Some(3));
        assert_eq!(uint(&rec, "c"), Some(7));
        assert_eq!(uint(&rec, "d"), None);
        assert_eq!(uint(&rec, "e"), None);
    }

    #[test]
    fn test_flags() {
        let rec = record(json!({"a": true, "b": 0, "c": "False", "d": "maybe"}));
        assert_eq!(flag(&rec, "a"), Some(true));
        assert_eq!(flag(&rec, "b"), Some(false));
        assert_eq!(flag(&rec, "c"), Some(false));
        assert_eq!(flag(&rec, "d"), None);
    }

    #[test]
    fn test_parse_timedelta_forms() {
        let expected = Some(Duration::from_millis(92_123));
        assert_eq!(parse_timedelta("0 days 00:01:32.123000"), expected);
        assert_eq!(parse_timedelta("00:01:32.123"), expected);
        assert_eq!(parse_timedelta("1:32.123"), expected);
        assert_eq!(parse_timedelta("92.123"), expected);
        assert_eq!(
            parse_timedelta("1 days 01:00:00"),
            Some(Duration::from_secs(90_000))
        );
        assert_eq!(parse_timedelta("fast"), None);
        assert_eq!(parse_timedelta("1:2:3:4"), None);
    }

    #[test]
    fn test_seconds_and_millis_round_to_ms() {
        let rec = record(json!({"s": 92.12349, "ms": 92123.6, "neg": -1.0}));
        assert_eq!(seconds(&rec, "s"), Some(Duration::from_millis(92_123)));
        assert_eq!(millis(&rec, "ms"), Some(Duration::from_millis(92_124)));
        assert_eq!(seconds(&rec, "neg"), None);
    }

    #[test]
    fn test_take_records_skips_non_objects() {
        let mut top = record(json!({"rows": [{"a": 1}, 5, {"b": 2}], "scalar": 3}));
        assert_eq!(take_records(&mut top, "rows").len(), 2);
        assert!(take_records(&mut top, "scalar").is_empty());
        assert!(take_records(&mut top, "absent").is_empty());
    }
}
