//! Timestamp decoding for legacy documents and ISO-8601 rendering.
//!
//! Legacy records store datetimes either as strings (RFC 3339, or naive
//! `YYYY-MM-DDTHH:MM:SS[.f]` which is taken to be UTC) or in extended-JSON
//! form: `{"$date": "<rfc3339>"}` / `{"$date": <millis>}` /
//! `{"$date": {"$numberLong": "<millis>"}}`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use super::document::json_type_name;

/// Decode a legacy timestamp value. `Ok(None)` means the value was null.
pub fn parse_legacy_datetime(value: &Value) -> Result<Option<DateTime<Utc>>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => parse_datetime_str(s).map(Some),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("timestamp {n} is not an integer millisecond count"))
            .and_then(from_millis)
            .map(Some),
        Value::Object(obj) => match obj.get("$date") {
            Some(Value::String(s)) => parse_datetime_str(s).map(Some),
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| format!("timestamp {n} is not an integer millisecond count"))
                .and_then(from_millis)
                .map(Some),
            Some(Value::Object(inner)) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .ok_or_else(|| "unsupported $date encoding".to_string())?
                .parse::<i64>()
                .map_err(|e| e.to_string())
                .and_then(from_millis)
                .map(Some),
            _ => Err("object is not an extended-JSON $date".to_string()),
        },
        other => Err(format!("expected a timestamp, found {}", json_type_name(other))),
    }
}

/// Parse a textual timestamp. Values without an offset are treated as UTC.
pub fn parse_datetime_str(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Some(dt) = s
        .strip_suffix('Z')
        .and_then(|rest| NaiveDateTime::parse_from_str(rest, "%Y-%m-%dT%H:%M").ok())
    {
        return Ok(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    Err(format!("'{s}' is not an ISO-8601 timestamp"))
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| format!("timestamp {millis} is out of range"))
}

/// Render a UTC timestamp the way downstream readers expect it,
/// e.g. `2013-10-12T13:00:00+00:00`.
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn epoch_seconds(now: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let micros = now.timestamp_micros() as f64;
    micros / 1_000_000.0
}
