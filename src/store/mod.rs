//! Access to meter topology and stored counter readings.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::ops::{Bound, RangeBounds};

use crate::engine::types::{MeterKind, Sample, SampleGroup, TemperatureReading, Unit};
pub use crate::error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::PgMeasurementStore;

/// Timestamp filter applied when fetching samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Bound<DateTime<Utc>>,
    pub end: Bound<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Both endpoints excluded.
    pub fn open(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Excluded(from),
            end: Bound::Excluded(to),
        }
    }

    /// Both endpoints included.
    pub fn closed(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Included(from),
            end: Bound::Included(to),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        (self.start, self.end).contains(&timestamp)
    }
}

pub const TEMPERATURE_RESOURCE: &str = "temperature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    MeterPort,
    Submeter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterRef {
    pub kind: MeterKind,
    pub id: i64,
    pub name: String,
    pub home_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterPort {
    pub id: i64,
    pub name: String,
    pub resource_type: String,
    pub unit: Unit,
    /// The main meter or submeter this port is wired to, if any.
    pub meter: Option<MeterRef>,
}

/// Port ids of the four streams a virtual energy port combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualEnergyPort {
    pub id: i64,
    pub consumption: i64,
    pub current: i64,
    pub voltage: i64,
    pub power_factor: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedValuePort {
    pub id: i64,
    pub value: i64,
    pub resolution_in_seconds: i64,
}

/// Read-only view of the measurement database.
///
/// Every sample sequence returned is ordered by timestamp ascending.
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    async fn meter_port(&self, port_id: i64) -> Result<Option<MeterPort>, StoreError>;

    /// Ports wired to the home's main meters or submeters, ordered by id.
    async fn home_meter_ports(
        &self,
        home_id: i64,
        kind: MeterKind,
    ) -> Result<Vec<MeterPort>, StoreError>;

    /// Submeter ports linked to an energy production period of one of the
    /// home's appliances.
    async fn production_meter_ports(&self, home_id: i64) -> Result<Vec<MeterPort>, StoreError>;

    async fn port_has_samples(&self, port_id: i64) -> Result<bool, StoreError>;

    async fn samples_for_port(
        &self,
        port_id: i64,
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError>;

    /// Samples of all listed ports merged into one sequence.
    async fn samples_for_ports(
        &self,
        port_ids: &[i64],
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError>;

    /// Samples of the listed ports split by `key`, groups ordered by key.
    async fn samples_for_ports_grouped_by(
        &self,
        port_ids: &[i64],
        key: GroupKey,
        range: TimeRange,
    ) -> Result<Vec<SampleGroup>, StoreError>;

    /// Every virtual energy port registered under `virtual_port_id`.
    async fn virtual_energy_ports(
        &self,
        virtual_port_id: i64,
    ) -> Result<Vec<VirtualEnergyPort>, StoreError>;

    async fn fixed_value_port(&self, port_id: i64) -> Result<Option<FixedValuePort>, StoreError>;

    /// Readings of the home's submeter temperature ports, ordered by
    /// submeter name, then timestamp.
    async fn temperature_readings(
        &self,
        home_id: i64,
        range: TimeRange,
    ) -> Result<Vec<TemperatureReading>, StoreError>;
}
