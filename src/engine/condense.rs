use chrono::{DateTime, Utc};

use super::align::{resolution_aligned, ResolutionAligned};
use super::resolution::Resolution;
use super::types::{CondensedValue, Sample, Unit};
use crate::error::EngineError;

/// Deltas between consecutive resolution-aligned points.
#[derive(Debug, Clone)]
pub struct Condensed<'a> {
    aligned: ResolutionAligned<'a>,
    previous: Option<Sample>,
}

pub fn condense(raw: &[Sample], from: DateTime<Utc>, resolution: Resolution) -> Condensed<'_> {
    Condensed {
        aligned: resolution_aligned(raw, from, resolution),
        previous: None,
    }
}

impl Iterator for Condensed<'_> {
    type Item = CondensedValue;

    fn next(&mut self) -> Option<CondensedValue> {
        let start = match self.previous.take() {
            Some(sample) => sample,
            None => self.aligned.next()?,
        };
        let stop = self.aligned.next()?;
        self.previous = Some(stop);
        Some(CondensedValue {
            from_timestamp: start.timestamp,
            to_timestamp: stop.timestamp,
            value: stop.value - start.value,
        })
    }
}

pub fn ensure_energy_unit(port_id: i64, unit: Unit) -> Result<(), EngineError> {
    if unit == Unit::Energy {
        Ok(())
    } else {
        Err(EngineError::UnsupportedUnit { port_id, unit })
    }
}

/// Condenses `raw`, retrying once over zero-padded boundaries when the
/// first pass produces nothing.
///
/// The padding places zero readings two and one resolution steps before the
/// earliest sample and after the latest one, so a window holding a single
/// reading still yields intervals.
pub fn condense_with_recovery(
    raw: &[Sample],
    from: DateTime<Utc>,
    resolution: Resolution,
) -> Result<Vec<CondensedValue>, EngineError> {
    let values: Vec<_> = condense(raw, from, resolution).collect();
    if !values.is_empty() {
        return Ok(values);
    }

    let padded = pad_boundaries(raw, resolution).ok_or(EngineError::InsufficientData)?;
    tracing::debug!(
        samples = raw.len(),
        "no condensed output, retrying with padded boundaries"
    );
    let values: Vec<_> = condense(&padded, from, resolution).collect();
    if values.is_empty() {
        return Err(EngineError::InsufficientData);
    }
    Ok(values)
}

fn pad_boundaries(raw: &[Sample], resolution: Resolution) -> Option<Vec<Sample>> {
    let earliest = raw.first()?.timestamp;
    let latest = raw.last()?.timestamp;

    let mut padded = Vec::with_capacity(raw.len() + 4);
    padded.push(Sample::new(resolution.shift(earliest, -2)?, 0));
    padded.push(Sample::new(resolution.shift(earliest, -1)?, 0));
    padded.extend_from_slice(raw);
    padded.push(Sample::new(resolution.shift(latest, 1)?, 0));
    padded.push(Sample::new(resolution.shift(latest, 2)?, 0));
    Some(padded)
}
