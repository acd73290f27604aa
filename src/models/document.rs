//! Loosely typed documents and the field readers used to decode them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DecodeError;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// A record as returned by the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    /// Server timestamp assigned at creation (or last upsert)
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn required_str(&self, field: &'static str) -> Result<String, DecodeError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(DecodeError::MissingField(field)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(DecodeError::InvalidField {
                field,
                reason: format!("expected a string, found {}", json_type(other)),
            }),
        }
    }

    /// Absent, null and empty strings all read as `None`.
    pub fn optional_str(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(DecodeError::InvalidField {
                field,
                reason: format!("expected a string, found {}", json_type(other)),
            }),
        }
    }

    pub fn required_i64(&self, field: &'static str) -> Result<i64, DecodeError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| DecodeError::InvalidField {
                field,
                reason: format!("{} is not an integer", n),
            }),
            Some(other) => Err(DecodeError::InvalidField {
                field,
                reason: format!("expected an integer, found {}", json_type(other)),
            }),
        }
    }

    pub fn optional_u64(&self, field: &'static str) -> Result<Option<u64>, DecodeError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
                DecodeError::InvalidField {
                    field,
                    reason: format!("{} is not a non-negative integer", n),
                }
            }),
            Some(other) => Err(DecodeError::InvalidField {
                field,
                reason: format!("expected an integer, found {}", json_type(other)),
            }),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a stored calendar date.
///
/// Accepted forms are `YYYY-MM-DD` (read as midnight), `YYYY-MM-DDTHH:MM`,
/// `YYYY-MM-DDTHH:MM:SS` and RFC 3339 timestamps, which are converted to UTC.
/// Every sort and filter path goes through this function.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDateTime, DecodeError> {
    let s = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    Err(DecodeError::InvalidDate(raw.to_string()))
}
