use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use url::form_urlencoded;

use crate::engine::{Resolution, Tolerance};
use crate::error::{AppError, EngineError};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Decoded query string of a request.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn parse(raw: Option<String>) -> Self {
        let mut out = BTreeMap::new();
        if let Some(raw) = raw {
            for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
                out.insert(key.into_owned(), value.into_owned());
            }
        }
        Self(out)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        self.get(key)
            .map(|raw| {
                parse_timestamp(raw).ok_or_else(|| {
                    AppError::bad_request(format!("{key} is not a valid timestamp: {raw}"))
                })
            })
            .transpose()
    }

    /// `from_timestamp` and `to_timestamp`, both mandatory.
    pub fn required_window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        self.optional_window()?.ok_or_else(|| {
            EngineError::invalid_time_span("from_timestamp and to_timestamp must be given").into()
        })
    }

    /// `from_timestamp` and `to_timestamp`, both or neither.
    pub fn optional_window(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, AppError> {
        match (self.timestamp("from_timestamp")?, self.timestamp("to_timestamp")?) {
            (Some(from), Some(to)) => Ok(Some((from, to))),
            (None, None) => Ok(None),
            _ => Err(EngineError::invalid_time_span(
                "from_timestamp and to_timestamp must be given together",
            )
            .into()),
        }
    }

    pub fn resolution(&self) -> Result<Option<Resolution>, AppError> {
        self.get("tau")
            .map(Resolution::parse)
            .transpose()
            .map_err(AppError::from)
    }

    pub fn required_resolution(&self) -> Result<Resolution, AppError> {
        let tag = self.get("tau").unwrap_or_default();
        Resolution::parse(tag).map_err(AppError::from)
    }

    pub fn tolerance(&self) -> Result<Tolerance, AppError> {
        let tag = self.get("tolerance").unwrap_or_default();
        Tolerance::parse(tag).map_err(AppError::from)
    }

    pub fn page(&self) -> Option<&str> {
        self.get("page")
    }
}

/// RFC 3339, or a naive timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // an unescaped '+' in a query string decodes to a space
    if let Some((head, offset)) = raw.rsplit_once(' ') {
        let repaired = format!("{head}+{offset}");
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&repaired) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
