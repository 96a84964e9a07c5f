/// A drop in a cumulative counter that is treated as a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterReset {
    /// Index of the reading just before the drop.
    pub index: usize,
    pub compensation: i64,
}

/// Finds triplets `v[i], v[i+1], v[i+2]` where the counter drops and then
/// does not drop again. A drop on the final reading is never flagged.
pub fn counter_resets(values: &[i64]) -> impl Iterator<Item = CounterReset> + '_ {
    values.windows(3).enumerate().filter_map(|(index, window)| {
        let (before, dropped, after) = (window[0], window[1], window[2]);
        (dropped < before && dropped <= after).then_some(CounterReset {
            index,
            compensation: before - dropped,
        })
    })
}

/// `last - first` plus every reset compensation; zero for an empty series.
pub fn compensated_total(values: &[i64]) -> i64 {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return 0;
    };
    let compensation: i64 = counter_resets(values).map(|reset| reset.compensation).sum();
    last - first + compensation
}
