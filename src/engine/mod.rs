//! Pure computation over time-ordered counter samples. Nothing in here
//! touches the store or performs I/O.

pub mod aggregate;
pub mod align;
pub mod condense;
pub mod discrepancy;
pub mod fixed_value;
pub mod interpolate;
pub mod resets;
pub mod resolution;
pub mod types;
pub mod virtual_port;

pub use aggregate::Aggregate;
pub use resolution::{Resolution, Tolerance};
pub use types::{
    AveragePower, CondensedValue, Measurement, MeterKind, PowerFlow, Sample, SampleGroup,
    StatusReport, TemperatureReading, Unit, VirtualEnergyMeasurement,
};

use chrono::TimeDelta;

pub(crate) fn total_nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos())
}
