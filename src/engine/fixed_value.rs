use chrono::{DateTime, TimeDelta, Timelike, Utc};

use super::total_nanos;
use super::types::Sample;
use crate::error::EngineError;

pub const MAX_FIXED_VALUE_SAMPLES: i128 = 100_000;

/// Synthesizes a constant series for a fixed-value meter port.
///
/// `floor((to - from) / resolution)` samples are produced, starting at
/// `from` truncated to the hour and spaced `resolution_seconds` apart.
/// Windows needing more than [`MAX_FIXED_VALUE_SAMPLES`] are rejected.
pub fn fixed_value_samples(
    value: i64,
    resolution_seconds: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Sample>, EngineError> {
    let step = TimeDelta::try_seconds(resolution_seconds)
        .filter(|_| resolution_seconds > 0)
        .ok_or_else(|| EngineError::InvalidResolutionValue {
            given: resolution_seconds.to_string(),
            allowed: "a positive number of seconds".to_string(),
        })?;

    let window = total_nanos(to - from);
    let count = if window > 0 {
        window / total_nanos(step)
    } else {
        0
    };
    if count > MAX_FIXED_VALUE_SAMPLES {
        return Err(EngineError::invalid_time_span(format!(
            "time span needs {count} fixed value samples, at most {MAX_FIXED_VALUE_SAMPLES} allowed"
        )));
    }

    let start = from
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| EngineError::invalid_time_span("cannot truncate start to the hour"))?;

    let mut samples = Vec::with_capacity(count as usize);
    let mut timestamp = start;
    for _ in 0..count {
        samples.push(Sample::new(timestamp, value));
        timestamp = timestamp
            .checked_add_signed(step)
            .ok_or_else(|| EngineError::invalid_time_span("time span out of range"))?;
    }
    Ok(samples)
}
