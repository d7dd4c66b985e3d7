//! Timestamp codec for QuakeML origin times and ShakeMap event stamps.
//!
//! Accepts the restricted ISO-8601 shape used by both formats,
//! `YYYY-MM-DDTHH:MM:SS[.ffffff]` followed by `Z` or `UTC`, and renders the
//! canonical `Z` form with microsecond precision.

use chrono::{NaiveDate, NaiveDateTime};

use crate::util::error::{ConversionError, Result};

/// Calendar components of an event time.
///
/// Components are kept as decoded, without calendar validation, so that a
/// catalog row can be rebuilt exactly from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    /// Seconds including the fractional part.
    pub second: f64,
}

impl EventTime {
    /// Convert to a `chrono` datetime, or `None` if the components do not
    /// form a valid calendar instant.
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        if !self.second.is_finite() || self.second < 0.0 {
            return None;
        }
        let whole = self.second.trunc();
        let micros = ((self.second - whole) * 1_000_000.0).round() as u32;
        let month = u32::try_from(self.month).ok()?;
        let day = u32::try_from(self.day).ok()?;
        NaiveDate::from_ymd_opt(self.year, month, day)?
            .and_hms_micro_opt(
                u32::try_from(self.hour).ok()?,
                u32::try_from(self.minute).ok()?,
                whole as u32,
                micros.min(999_999),
            )
    }
}

/// Parse a timestamp ending in `Z` or `UTC` into its calendar components.
///
/// # Errors
/// Returns [`ConversionError::InvalidTimestamp`] for any other timezone
/// marker, a missing `T` separator, or components that are not numbers.
pub fn parse_timestamp(text: &str) -> Result<EventTime> {
    let text = text.trim();
    let stripped = text
        .strip_suffix("UTC")
        .or_else(|| text.strip_suffix('Z'))
        .ok_or_else(|| {
            ConversionError::InvalidTimestamp(format!(
                "cannot handle timezone other than Z(ulu) or UTC: {text}"
            ))
        })?;

    let (date, time) = stripped
        .split_once('T')
        .ok_or_else(|| ConversionError::InvalidTimestamp(format!("missing 'T' separator: {text}")))?;

    let date_parts: Vec<&str> = date.split('-').collect();
    let time_parts: Vec<&str> = time.split(':').collect();
    if date_parts.len() != 3 || time_parts.len() != 3 {
        return Err(ConversionError::InvalidTimestamp(format!(
            "expected YYYY-MM-DDTHH:MM:SS: {text}"
        )));
    }

    let int = |part: &str| -> Result<i32> {
        part.trim().parse::<i32>().map_err(|e| {
            ConversionError::InvalidTimestamp(format!("bad component {part:?} in {text}: {e}"))
        })
    };
    let second = time_parts[2].trim().parse::<f64>().map_err(|e| {
        ConversionError::InvalidTimestamp(format!("bad seconds {:?} in {text}: {e}", time_parts[2]))
    })?;

    Ok(EventTime {
        year: int(date_parts[0])?,
        month: int(date_parts[1])?,
        day: int(date_parts[2])?,
        hour: int(time_parts[0])?,
        minute: int(time_parts[1])?,
        second,
    })
}

/// Render calendar components as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
///
/// Month and day below 1 are raised to 1 so that rows with unset date
/// parts still produce a valid date. A non-finite second renders as zero.
pub fn format_timestamp(time: &EventTime) -> String {
    let second = if time.second.is_finite() {
        time.second
    } else {
        0.0
    };
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:09.6}Z",
        time.year,
        time.month.max(1),
        time.day.max(1),
        time.hour,
        time.minute,
        second
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zulu() {
        let t = parse_timestamp("2018-01-02T03:04:05.000000Z").unwrap();
        assert_eq!((t.year, t.month, t.day, t.hour, t.minute), (2018, 1, 2, 3, 4));
        assert_eq!(t.second, 5.0);
    }

    #[test]
    fn test_parse_utc_matches_zulu() {
        let utc = parse_timestamp("2015-09-16T22:54:32.5UTC").unwrap();
        let zulu = parse_timestamp("2015-09-16T22:54:32.5Z").unwrap();
        assert_eq!(utc, zulu);
        assert_eq!(utc.second, 32.5);
    }

    #[test]
    fn test_parse_rejects_offset() {
        let err = parse_timestamp("2018-01-02T03:04:05+01:00").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_parse_rejects_garbage_component() {
        assert!(parse_timestamp("2018-xx-02T03:04:05Z").is_err());
        assert!(parse_timestamp("2018-01-02 03:04:05Z").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let s = "2018-01-02T03:04:05.123456Z";
        assert_eq!(format_timestamp(&parse_timestamp(s).unwrap()), s);
    }

    #[test]
    fn test_format_clamps_month_and_day() {
        let t = EventTime {
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: f64::NAN,
        };
        assert_eq!(format_timestamp(&t), "0000-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_to_naive_datetime() {
        let t = parse_timestamp("2018-01-02T03:04:05.25Z").unwrap();
        let dt = t.to_naive_datetime().unwrap();
        assert_eq!(dt.to_string(), "2018-01-02 03:04:05.250");

        let invalid = EventTime { month: 13, ..t };
        assert!(invalid.to_naive_datetime().is_none());
    }
}
