//! Request-level operations: fetch from the store, validate, hand off to the engine.

pub mod aggregated;
pub mod condensed;
pub mod fixed_value;
pub mod measurements;
pub mod status;
pub mod temperature;
pub mod virtual_energy;

use chrono::{DateTime, Utc};

use crate::engine::Resolution;
use crate::error::EngineError;

/// `(from - step, to + step)`, the fetch window that lets the first and last
/// aligned points interpolate against readings outside the requested span.
pub(crate) fn padded_bounds(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    resolution: Resolution,
) -> Result<(DateTime<Utc>, DateTime<Utc>), EngineError> {
    let start = resolution.shift(from, -1);
    let end = resolution.shift(to, 1);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(EngineError::invalid_time_span("time span out of range")),
    }
}

pub(crate) fn ensure_ordered(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), EngineError> {
    if to < from {
        tracing::warn!(%from, %to, "rejected reversed time span");
        return Err(EngineError::invalid_time_span(
            "from_timestamp must not be later than to_timestamp",
        ));
    }
    Ok(())
}
