// Serde helpers for the backend's JSON shapes.

use serde::{Deserialize, Serialize};

/// Every successful backend response wraps its payload as `{ "data": ... }`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// Error bodies carry a human readable `message`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// `startDate` travels as an ISO datetime (from the backend) or a bare
/// `YYYY-MM-DD` (from the date input); locally it is always date-only.
pub mod date_only {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Datetimes with an offset are converted to their UTC calendar date.
    pub fn parse(s: &str) -> Result<NaiveDate, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.naive_utc().date());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, FORMAT) {
            return Ok(d);
        }
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(ndt.date());
        }
        Err(format!("invalid date `{s}`"))
    }
}
