//! Canonical row type of a seismic event catalog.
//!
//! Every `event` element of a QuakeML document decodes into one
//! [`EventRecord`], and every record encodes back into one `event`. The
//! serde names are the catalog column names, so the same struct is the CSV
//! and JSON row as well.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

use crate::core::timestamp::EventTime;

/// Column names of the catalog table, in table order.
pub const CATALOG_COLUMNS: [&str; 30] = [
    "eventID",
    "agency",
    "Identifier",
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "timeUncertainty",
    "longitude",
    "longitudeUncertainty",
    "latitude",
    "latitudeUncertainty",
    "horizontalUncertainty",
    "maxHorizontalUncertainty",
    "minHorizontalUncertainty",
    "azimuthMaxHorizontalUncertainty",
    "depth",
    "depthUncertainty",
    "magnitude",
    "magnitudeUncertainty",
    "rake",
    "rakeUncertainty",
    "dip",
    "dipUncertainty",
    "strike",
    "strikeUncertainty",
    "type",
    "probability",
];

/// One event of a catalog.
///
/// Missing numeric values are NaN; missing date parts and text are `None`.
/// Field order matches [`CATALOG_COLUMNS`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Public id of the event (`quakeml:quakeledger/...`).
    #[serde(rename = "eventID")]
    pub event_id: String,

    /// Author of the origin.
    #[serde(deserialize_with = "lenient_text")]
    pub agency: Option<String>,

    /// Reserved; never populated by the readers.
    #[serde(rename = "Identifier", deserialize_with = "lenient_text")]
    pub identifier: Option<String>,

    #[serde(deserialize_with = "lenient_int")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient_int")]
    pub month: Option<i32>,
    #[serde(deserialize_with = "lenient_int")]
    pub day: Option<i32>,
    #[serde(deserialize_with = "lenient_int")]
    pub hour: Option<i32>,
    #[serde(deserialize_with = "lenient_int")]
    pub minute: Option<i32>,
    /// Seconds including the fractional part.
    #[serde(deserialize_with = "lenient_f64")]
    pub second: f64,
    /// Origin time uncertainty in seconds.
    #[serde(rename = "timeUncertainty", deserialize_with = "lenient_f64")]
    pub time_uncertainty: f64,

    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
    #[serde(rename = "longitudeUncertainty", deserialize_with = "lenient_f64")]
    pub longitude_uncertainty: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(rename = "latitudeUncertainty", deserialize_with = "lenient_f64")]
    pub latitude_uncertainty: f64,

    #[serde(rename = "horizontalUncertainty", deserialize_with = "lenient_f64")]
    pub horizontal_uncertainty: f64,
    #[serde(rename = "maxHorizontalUncertainty", deserialize_with = "lenient_f64")]
    pub max_horizontal_uncertainty: f64,
    #[serde(rename = "minHorizontalUncertainty", deserialize_with = "lenient_f64")]
    pub min_horizontal_uncertainty: f64,
    #[serde(
        rename = "azimuthMaxHorizontalUncertainty",
        deserialize_with = "lenient_f64"
    )]
    pub azimuth_max_horizontal_uncertainty: f64,

    /// Depth in kilometres.
    #[serde(deserialize_with = "lenient_f64")]
    pub depth: f64,
    #[serde(rename = "depthUncertainty", deserialize_with = "lenient_f64")]
    pub depth_uncertainty: f64,

    #[serde(deserialize_with = "lenient_f64")]
    pub magnitude: f64,
    #[serde(rename = "magnitudeUncertainty", deserialize_with = "lenient_f64")]
    pub magnitude_uncertainty: f64,

    #[serde(deserialize_with = "lenient_f64")]
    pub rake: f64,
    #[serde(rename = "rakeUncertainty", deserialize_with = "lenient_f64")]
    pub rake_uncertainty: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub dip: f64,
    #[serde(rename = "dipUncertainty", deserialize_with = "lenient_f64")]
    pub dip_uncertainty: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub strike: f64,
    #[serde(rename = "strikeUncertainty", deserialize_with = "lenient_f64")]
    pub strike_uncertainty: f64,

    /// Free-text description (`expert`, `historic`, ...), not the QuakeML
    /// event type.
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub event_type: Option<String>,

    /// Reserved; never populated by the readers.
    #[serde(deserialize_with = "lenient_f64")]
    pub probability: f64,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            event_id: String::new(),
            agency: None,
            identifier: None,
            year: None,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: f64::NAN,
            time_uncertainty: f64::NAN,
            longitude: f64::NAN,
            longitude_uncertainty: f64::NAN,
            latitude: f64::NAN,
            latitude_uncertainty: f64::NAN,
            horizontal_uncertainty: f64::NAN,
            max_horizontal_uncertainty: f64::NAN,
            min_horizontal_uncertainty: f64::NAN,
            azimuth_max_horizontal_uncertainty: f64::NAN,
            depth: f64::NAN,
            depth_uncertainty: f64::NAN,
            magnitude: f64::NAN,
            magnitude_uncertainty: f64::NAN,
            rake: f64::NAN,
            rake_uncertainty: f64::NAN,
            dip: f64::NAN,
            dip_uncertainty: f64::NAN,
            strike: f64::NAN,
            strike_uncertainty: f64::NAN,
            event_type: None,
            probability: f64::NAN,
        }
    }
}

impl EventRecord {
    /// Store decoded calendar components in the date/time columns.
    pub fn set_time(&mut self, time: &EventTime) {
        self.year = Some(time.year);
        self.month = Some(time.month);
        self.day = Some(time.day);
        self.hour = Some(time.hour);
        self.minute = Some(time.minute);
        self.second = time.second;
    }

    /// Calendar components of the origin time with unset parts as zero.
    pub fn event_time(&self) -> EventTime {
        EventTime {
            year: self.year.unwrap_or(0),
            month: self.month.unwrap_or(0),
            day: self.day.unwrap_or(0),
            hour: self.hour.unwrap_or(0),
            minute: self.minute.unwrap_or(0),
            second: if self.second.is_nan() { 0.0 } else { self.second },
        }
    }

    /// Origin time as a datetime, if the row holds a valid calendar instant.
    pub fn origin_time(&self) -> Option<NaiveDateTime> {
        self.event_time().to_naive_datetime()
    }
}

/// Parse a table cell as `f64`; NaN when empty or unparsable.
pub fn parse_lenient_f64(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell.as_deref().map(parse_lenient_f64).unwrap_or(f64::NAN))
}

/// Integer cells may be written as floats (`2018.0`) by other tools.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell
        .as_deref()
        .map(parse_lenient_f64)
        .filter(|v| v.is_finite())
        .map(|v| v as i32))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_missing() {
        let record = EventRecord::default();
        assert!(record.magnitude.is_nan());
        assert!(record.probability.is_nan());
        assert!(record.year.is_none());
        assert!(record.origin_time().is_none());
    }

    #[test]
    fn test_event_time_fills_zero() {
        let record = EventRecord {
            year: Some(2018),
            ..Default::default()
        };
        let time = record.event_time();
        assert_eq!(time.year, 2018);
        assert_eq!(time.month, 0);
        assert_eq!(time.second, 0.0);
    }

    #[test]
    fn test_columns_match_serialised_header() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(EventRecord::default()).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, CATALOG_COLUMNS.join(","));
    }

    #[test]
    fn test_parse_lenient_f64() {
        assert_eq!(parse_lenient_f64(" 32.5 "), 32.5);
        assert!(parse_lenient_f64("NaN").is_nan());
        assert!(parse_lenient_f64("").is_nan());
        assert!(parse_lenient_f64("n/a").is_nan());
    }
}
