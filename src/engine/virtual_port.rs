//! Joins a virtual port's leading energy stream with its current, voltage and
//! power-factor streams.

use chrono::{DateTime, Utc};

use super::types::{Sample, VirtualEnergyMeasurement};

#[derive(Debug, Clone, Copy)]
pub struct FollowerStreams<'a> {
    pub current: &'a [Sample],
    pub voltage: &'a [Sample],
    pub power_factor: &'a [Sample],
}

/// One measurement per consecutive leader pair, with each follower reduced
/// to the mean of its samples inside the pair's closed interval.
///
/// An interval is dropped when any follower has no samples inside it.
pub fn virtual_energy_measurements<'a>(
    leader: &'a [Sample],
    followers: FollowerStreams<'a>,
) -> impl Iterator<Item = VirtualEnergyMeasurement> + 'a {
    leader.windows(2).filter_map(move |pair| {
        let (start, stop) = (pair[0], pair[1]);
        let window = (start.timestamp, stop.timestamp);
        Some(VirtualEnergyMeasurement {
            consumption_acc_start: start.value,
            consumption_acc_stop: stop.value,
            current: mean_within(followers.current, window)?,
            voltage: mean_within(followers.voltage, window)?,
            power_factor: mean_within(followers.power_factor, window)?,
            from_timestamp: start.timestamp,
            to_timestamp: stop.timestamp,
        })
    })
}

fn mean_within(samples: &[Sample], (from, to): (DateTime<Utc>, DateTime<Utc>)) -> Option<i64> {
    let lo = samples.partition_point(|s| s.timestamp < from);
    let hi = samples.partition_point(|s| s.timestamp <= to);
    let inside = samples.get(lo..hi)?;
    if inside.is_empty() {
        return None;
    }
    let sum: i128 = inside.iter().map(|s| i128::from(s.value)).sum();
    let mean = round_half_even(sum, inside.len() as i128);
    i64::try_from(mean).ok()
}

/// `numerator / denominator` rounded to nearest, ties to even.
fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let twice_remainder = 2 * numerator.rem_euclid(denominator);
    match twice_remainder.cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 0 => quotient,
        std::cmp::Ordering::Equal => quotient + 1,
    }
}
