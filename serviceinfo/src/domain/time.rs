//! ISO-8601 timestamp and delay handling.
//!
//! Update messages carry stop times as ISO-8601 timestamps with a UTC
//! offset (e.g. `2024-05-01T10:15:00+02:00`) and delays as ISO-8601
//! durations (e.g. `PT5M`). Delays are kept as whole minutes, which is the
//! granularity the feed reports them in and the form they are stored in.

use chrono::{DateTime, FixedOffset};

/// Error returned when parsing an invalid timestamp or duration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{input}': {reason}")]
pub struct TimeError {
    kind: &'static str,
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn timestamp(input: &str, reason: &'static str) -> Self {
        Self {
            kind: "timestamp",
            input: input.to_string(),
            reason,
        }
    }

    fn duration(input: &str, reason: &'static str) -> Self {
        Self {
            kind: "duration",
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse an ISO-8601 timestamp with a UTC offset.
///
/// Accepts RFC 3339 (`2024-05-01T10:15:00+02:00`, `...Z`) and the compact
/// offset form `2024-05-01T10:15:00+0200`.
///
/// # Examples
///
/// ```
/// use serviceinfo::domain::parse_iso_datetime;
///
/// let t = parse_iso_datetime("2024-05-01T10:15:00+02:00").unwrap();
/// assert_eq!(t.to_rfc3339(), "2024-05-01T10:15:00+02:00");
///
/// let t = parse_iso_datetime("2024-05-01T10:15:00+0200").unwrap();
/// assert_eq!(t.to_rfc3339(), "2024-05-01T10:15:00+02:00");
/// ```
pub fn parse_iso_datetime(s: &str) -> Result<DateTime<FixedOffset>, TimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeError::timestamp(s, "empty"));
    }

    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .map_err(|_| TimeError::timestamp(s, "expected YYYY-MM-DDTHH:MM:SS with offset"))
}

/// Format a timestamp as RFC 3339, the inverse of [`parse_iso_datetime`].
pub fn format_iso_datetime(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339()
}

/// Parse an ISO-8601 duration into whole minutes.
///
/// Supports `[-]P[nD][T[nH][nM][nS]]`. Seconds are truncated toward zero;
/// year and month designators are rejected because their length in minutes
/// is not fixed.
///
/// # Examples
///
/// ```
/// use serviceinfo::domain::parse_iso_delay;
///
/// assert_eq!(parse_iso_delay("PT5M").unwrap(), 5);
/// assert_eq!(parse_iso_delay("PT1H2M").unwrap(), 62);
/// assert_eq!(parse_iso_delay("-PT3M").unwrap(), -3);
/// assert_eq!(parse_iso_delay("PT90S").unwrap(), 1);
/// ```
pub fn parse_iso_delay(s: &str) -> Result<i64, TimeError> {
    let input = s.trim();
    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let rest = rest
        .strip_prefix('P')
        .ok_or_else(|| TimeError::duration(input, "must start with 'P'"))?;

    if rest.is_empty() {
        return Err(TimeError::duration(input, "no components"));
    }

    let mut total_seconds: i64 = 0;
    let mut in_time_part = false;
    let mut current = String::new();
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            'T' if !in_time_part => {
                if !current.is_empty() {
                    return Err(TimeError::duration(input, "number without designator"));
                }
                in_time_part = true;
            }
            '0'..='9' => current.push(c),
            'D' | 'H' | 'M' | 'S' => {
                if current.is_empty() {
                    return Err(TimeError::duration(input, "designator without number"));
                }
                let value: i64 = current
                    .parse()
                    .map_err(|_| TimeError::duration(input, "number out of range"))?;
                let unit = match (c, in_time_part) {
                    ('D', false) => 24 * 60 * 60,
                    ('H', true) => 60 * 60,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    ('M', false) => {
                        return Err(TimeError::duration(input, "months are not supported"));
                    }
                    _ => return Err(TimeError::duration(input, "misplaced designator")),
                };
                total_seconds = value
                    .checked_mul(unit)
                    .and_then(|v| total_seconds.checked_add(v))
                    .ok_or_else(|| TimeError::duration(input, "number out of range"))?;
                current.clear();
                saw_component = true;
            }
            _ => return Err(TimeError::duration(input, "unexpected character")),
        }
    }

    if !current.is_empty() || !saw_component {
        return Err(TimeError::duration(input, "incomplete duration"));
    }

    let minutes = total_seconds / 60;
    Ok(if negative { -minutes } else { minutes })
}
