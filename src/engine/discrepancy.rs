use chrono::{DateTime, TimeDelta, Utc};

use super::resolution::Tolerance;

/// A gap between two consecutive readings that exceeds the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGap {
    /// Position of the reading before the gap.
    pub index: usize,
    pub occurred_at: DateTime<Utc>,
    pub gap: TimeDelta,
}

impl TimeGap {
    /// Gap length in whole seconds, fractional part discarded.
    pub fn whole_seconds(&self) -> i64 {
        self.gap.num_seconds()
    }
}

pub fn detect_time_gaps(
    timestamps: &[DateTime<Utc>],
    tolerance: Tolerance,
) -> impl Iterator<Item = TimeGap> + '_ {
    let limit = tolerance.duration();
    timestamps
        .windows(2)
        .enumerate()
        .filter_map(move |(index, pair)| {
            let gap = pair[1] - pair[0];
            (gap > limit).then_some(TimeGap {
                index,
                occurred_at: pair[0],
                gap,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minutes(m: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date")
            + TimeDelta::minutes(m)
    }

    #[test]
    fn flags_gaps_longer_than_tolerance() {
        let stamps = [minutes(0), minutes(10), minutes(100), minutes(130), minutes(200)];
        let tolerance = Tolerance::parse("30min").unwrap();
        let gaps: Vec<_> = detect_time_gaps(&stamps, tolerance).collect();
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].index, 1);
        assert_eq!(gaps[0].occurred_at, minutes(10));
        assert_eq!(gaps[0].whole_seconds(), 90 * 60);
        assert_eq!(gaps[1].occurred_at, minutes(130));
    }

    #[test]
    fn gap_equal_to_tolerance_is_accepted() {
        let stamps = [minutes(0), minutes(60)];
        let tolerance = Tolerance::parse("1h").unwrap();
        assert_eq!(detect_time_gaps(&stamps, tolerance).count(), 0);
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        let stamps = [minutes(0), minutes(0) + TimeDelta::milliseconds(1_800_900)];
        let tolerance = Tolerance::parse("30min").unwrap();
        let gaps: Vec<_> = detect_time_gaps(&stamps, tolerance).collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].whole_seconds(), 1_800);
    }
}
