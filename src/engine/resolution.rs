//! Closed enumerations accepted for `tau` (condensation resolution) and for
//! the status tolerance, validated at the boundary before entering the engine.

use chrono::{DateTime, Months, TimeDelta, Utc};

use crate::error::EngineError;

/// Interval size for condensation.
///
/// Calendar steps are applied with calendar arithmetic: stepping `n` months
/// from a base clamps the day to the end of the target month, and is always
/// computed from the base rather than accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Seconds(i64),
    Months(u32),
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

const RESOLUTION_OPTIONS: &[(&str, Resolution)] = &[
    ("1min", Resolution::Seconds(MINUTE)),
    ("5min", Resolution::Seconds(5 * MINUTE)),
    ("10min", Resolution::Seconds(10 * MINUTE)),
    ("15min", Resolution::Seconds(15 * MINUTE)),
    ("20min", Resolution::Seconds(20 * MINUTE)),
    ("30min", Resolution::Seconds(30 * MINUTE)),
    ("1h", Resolution::Seconds(HOUR)),
    ("12h", Resolution::Seconds(12 * HOUR)),
    ("hourly", Resolution::Seconds(HOUR)),
    ("daily", Resolution::Seconds(DAY)),
    ("1d", Resolution::Seconds(DAY)),
    ("weekly", Resolution::Seconds(7 * DAY)),
    ("1w", Resolution::Seconds(7 * DAY)),
    ("monthly", Resolution::Months(1)),
    ("1m", Resolution::Months(1)),
    ("yearly", Resolution::Months(12)),
];

const TOLERANCE_OPTIONS: &[(&str, i64)] = &[
    ("30min", 30 * MINUTE),
    ("1h", HOUR),
    ("12h", 12 * HOUR),
    ("1d", DAY),
    ("1w", 7 * DAY),
    // a fixed 30 days, not a calendar month
    ("1m", 30 * DAY),
];

fn allowed_tags<T>(options: &[(&str, T)]) -> String {
    options
        .iter()
        .map(|(tag, _)| *tag)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Resolution {
    pub const HOURLY: Self = Self::Seconds(HOUR);
    pub const DAILY: Self = Self::Seconds(DAY);
    pub const MONTHLY: Self = Self::Months(1);
    pub const YEARLY: Self = Self::Months(12);

    pub fn parse(tag: &str) -> Result<Self, EngineError> {
        let tag = tag.trim();
        RESOLUTION_OPTIONS
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|(_, resolution)| *resolution)
            .ok_or_else(|| EngineError::InvalidResolutionValue {
                given: tag.to_string(),
                allowed: allowed_tags(RESOLUTION_OPTIONS),
            })
    }

    /// Fixed length of one step, or `None` for calendar-relative steps.
    pub fn fixed_duration(self) -> Option<TimeDelta> {
        match self {
            Self::Seconds(seconds) => TimeDelta::try_seconds(seconds),
            Self::Months(_) => None,
        }
    }

    /// `base + n * step`; `n` may be negative. `None` on overflow.
    pub fn shift(self, base: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Seconds(seconds) => {
                let delta = TimeDelta::try_seconds(seconds.checked_mul(n)?)?;
                base.checked_add_signed(delta)
            }
            Self::Months(months) => {
                let total = u32::try_from(n.unsigned_abs())
                    .ok()?
                    .checked_mul(months)?;
                if n >= 0 {
                    base.checked_add_months(Months::new(total))
                } else {
                    base.checked_sub_months(Months::new(total))
                }
            }
        }
    }

    /// Smallest `n >= 0` with `base + n * step >= target`, when it can be
    /// computed without walking the calendar.
    pub(crate) fn steps_to_reach(self, base: DateTime<Utc>, target: DateTime<Utc>) -> Option<i64> {
        let step = super::total_nanos(self.fixed_duration()?);
        if step <= 0 {
            return None;
        }
        let diff = super::total_nanos(target - base);
        if diff <= 0 {
            return Some(0);
        }
        let steps = (diff + step - 1) / step;
        i64::try_from(steps).ok()
    }
}

/// Largest gap between consecutive samples tolerated by status detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance(TimeDelta);

impl Tolerance {
    pub fn parse(tag: &str) -> Result<Self, EngineError> {
        let tag = tag.trim();
        TOLERANCE_OPTIONS
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .and_then(|(_, seconds)| TimeDelta::try_seconds(*seconds))
            .map(Self)
            .ok_or_else(|| EngineError::InvalidToleranceValue {
                given: tag.to_string(),
                allowed: allowed_tags(TOLERANCE_OPTIONS),
            })
    }

    pub fn duration(self) -> TimeDelta {
        self.0
    }
}
