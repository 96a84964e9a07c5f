//! Exact linear interpolation between two counter readings.
//!
//! The value is the weighted mean `(v0 * (span - elapsed) + v1 * elapsed) / span`
//! over nanoseconds, evaluated in `i128` and truncated toward zero. Both
//! weights are first divided by their common divisor, so whole-second
//! timestamps keep the products far below `i128::MAX`. No floating point is
//! involved.

use chrono::{DateTime, Utc};

use super::types::Sample;
use super::total_nanos;

/// Counter value at `target`, which must lie within `[before, after]`.
///
/// # Panics
///
/// Panics when `before` is not strictly earlier than `after`, or when `target`
/// falls outside the bracket. Callers only ever pass brackets they selected.
/// Also panics if the reduced weights still overflow `i128`, which needs a
/// bracket of several centuries with nanosecond-misaligned endpoints.
pub fn interpolate(target: DateTime<Utc>, before: &Sample, after: &Sample) -> i64 {
    assert!(
        before.timestamp < after.timestamp,
        "cannot interpolate over equal or reversed timestamps ({} .. {})",
        before.timestamp,
        after.timestamp
    );
    assert!(
        before.timestamp <= target && target <= after.timestamp,
        "target {target} outside of {} .. {}",
        before.timestamp,
        after.timestamp
    );

    if target == before.timestamp {
        return before.value;
    }
    if target == after.timestamp {
        return after.value;
    }

    let span = total_nanos(after.timestamp - before.timestamp);
    let elapsed = total_nanos(target - before.timestamp);
    let divisor = gcd(span, elapsed);
    let (span, elapsed) = (span / divisor, elapsed / divisor);

    let weighted = i128::from(before.value)
        .checked_mul(span - elapsed)
        .zip(i128::from(after.value).checked_mul(elapsed))
        .and_then(|(head, tail)| head.checked_add(tail));
    let Some(weighted) = weighted else {
        panic!(
            "interpolation weights overflow over {} .. {}",
            before.timestamp, after.timestamp
        );
    };
    // a weighted mean of the bracket values, so it always fits
    (weighted / span) as i64
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
