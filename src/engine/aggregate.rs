use chrono::{DateTime, Utc};
use serde::Serialize;

use super::condense::condense;
use super::resets::compensated_total;
use super::resolution::Resolution;
use super::types::{AveragePower, CondensedValue, Sample, SampleGroup, Unit};

/// Result of a home-level aggregation: interval deltas when a resolution was
/// requested, otherwise one total over the whole window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Aggregate {
    Condensed(Vec<CondensedValue>),
    Total(AveragePower),
}

fn window_total(value: i64, from: DateTime<Utc>, to: DateTime<Utc>) -> Aggregate {
    Aggregate::Total(AveragePower {
        value,
        from_timestamp: from,
        to_timestamp: to,
        unit: Unit::Energy,
    })
}

/// Aggregates the merged, time-ordered samples of every mainmeter energy port.
pub fn mainmeter_consumption(
    samples: &[Sample],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    resolution: Option<Resolution>,
) -> Aggregate {
    match resolution {
        Some(resolution) => Aggregate::Condensed(condense(samples, from, resolution).collect()),
        None => {
            let values: Vec<i64> = samples.iter().map(|sample| sample.value).collect();
            window_total(compensated_total(&values), from, to)
        }
    }
}

/// Aggregates per-submeter sample groups, summing across submeters.
pub fn submeter_production(
    groups: &[SampleGroup],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    resolution: Option<Resolution>,
) -> Aggregate {
    match resolution {
        Some(resolution) => {
            let streams: Vec<_> = groups
                .iter()
                .map(|group| condense(&group.samples, from, resolution))
                .collect();
            Aggregate::Condensed(SummedCondensed::new(streams).collect())
        }
        None => {
            let total = groups
                .iter()
                .map(|group| {
                    let values: Vec<i64> = group.samples.iter().map(|s| s.value).collect();
                    compensated_total(&values)
                })
                .sum();
            window_total(total, from, to)
        }
    }
}

/// Walks several condensed streams in lockstep, stopping at the shortest.
#[derive(Debug, Clone)]
pub struct SummedCondensed<I> {
    streams: Vec<I>,
}

impl<I> SummedCondensed<I> {
    pub fn new(streams: Vec<I>) -> Self {
        Self { streams }
    }
}

impl<I> Iterator for SummedCondensed<I>
where
    I: Iterator<Item = CondensedValue>,
{
    type Item = CondensedValue;

    /// # Panics
    ///
    /// Panics when two streams disagree on an interval boundary. Streams
    /// condensed from the same origin and resolution always agree.
    fn next(&mut self) -> Option<CondensedValue> {
        let mut streams = self.streams.iter_mut();
        let mut sum = streams.next()?.next()?;
        for stream in streams {
            let value = stream.next()?;
            assert_eq!(
                (value.from_timestamp, value.to_timestamp),
                (sum.from_timestamp, sum.to_timestamp),
                "condensed streams are not aligned"
            );
            sum.value += value.value;
        }
        Some(sum)
    }
}
