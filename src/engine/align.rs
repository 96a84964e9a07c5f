use chrono::{DateTime, Utc};

use super::interpolate::interpolate;
use super::resolution::Resolution;
use super::types::Sample;

/// Lazily re-samples a time-ordered series onto `from + n * resolution`.
///
/// Target timestamps before the first sample are skipped and none are
/// produced past the last sample. Clone it to restart from the same state.
#[derive(Debug, Clone)]
pub struct ResolutionAligned<'a> {
    raw: &'a [Sample],
    pair: usize,
    from: DateTime<Utc>,
    resolution: Resolution,
    step: i64,
    cursor: Option<DateTime<Utc>>,
}

pub fn resolution_aligned(
    raw: &[Sample],
    from: DateTime<Utc>,
    resolution: Resolution,
) -> ResolutionAligned<'_> {
    ResolutionAligned {
        raw,
        pair: 0,
        from,
        resolution,
        step: 0,
        cursor: Some(from),
    }
}

impl ResolutionAligned<'_> {
    fn advance(&mut self) {
        self.step += 1;
        self.cursor = self.resolution.shift(self.from, self.step);
    }

    fn skip_before(&mut self, earliest: DateTime<Utc>) {
        if let Some(steps) = self.resolution.steps_to_reach(self.from, earliest) {
            if steps > self.step {
                self.step = steps;
                self.cursor = self.resolution.shift(self.from, steps);
            }
        }
        while let Some(cursor) = self.cursor {
            if cursor >= earliest {
                break;
            }
            self.advance();
        }
    }
}

impl Iterator for ResolutionAligned<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        loop {
            let before = *self.raw.get(self.pair)?;
            let after = *self.raw.get(self.pair + 1)?;
            self.skip_before(before.timestamp);
            let cursor = self.cursor?;

            // pairs without a forward time step bracket nothing
            if before.timestamp < after.timestamp && cursor <= after.timestamp {
                let value = interpolate(cursor, &before, &after);
                self.advance();
                return Some(Sample::new(cursor, value));
            }
            self.pair += 1;
        }
    }
}
