use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

use super::{
    FixedValuePort, GroupKey, MeasurementStore, MeterPort, StoreError, TimeRange,
    VirtualEnergyPort, TEMPERATURE_RESOURCE,
};
use crate::engine::types::{MeterKind, Sample, SampleGroup, TemperatureReading};

/// Store held entirely in memory, populated through the `with_*` builders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    ports: BTreeMap<i64, MeterPort>,
    production_ports: BTreeSet<i64>,
    samples: BTreeMap<i64, Vec<Sample>>,
    virtual_ports: Vec<VirtualEnergyPort>,
    fixed_value_ports: BTreeMap<i64, FixedValuePort>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: MeterPort) -> Self {
        self.ports.insert(port.id, port);
        self
    }

    /// Registers a submeter port that records an appliance's production.
    pub fn with_production_port(mut self, port: MeterPort) -> Self {
        self.production_ports.insert(port.id);
        self.with_port(port)
    }

    pub fn with_samples(mut self, port_id: i64, samples: impl IntoIterator<Item = Sample>) -> Self {
        let stored = self.samples.entry(port_id).or_default();
        stored.extend(samples);
        stored.sort_by_key(|sample| sample.timestamp);
        self
    }

    pub fn with_virtual_port(mut self, port: VirtualEnergyPort) -> Self {
        self.virtual_ports.push(port);
        self
    }

    pub fn with_fixed_value_port(mut self, port: FixedValuePort) -> Self {
        self.fixed_value_ports.insert(port.id, port);
        self
    }

    fn samples_in(&self, port_id: i64, range: TimeRange) -> impl Iterator<Item = Sample> + '_ {
        self.samples
            .get(&port_id)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |sample| range.contains(sample.timestamp))
    }

    fn group_key(&self, port_id: i64, key: GroupKey) -> Option<i64> {
        match key {
            GroupKey::MeterPort => Some(port_id),
            GroupKey::Submeter => self
                .ports
                .get(&port_id)
                .and_then(|port| port.meter.as_ref())
                .filter(|meter| meter.kind == MeterKind::Sub)
                .map(|meter| meter.id),
        }
    }
}

#[async_trait]
impl MeasurementStore for InMemoryStore {
    async fn meter_port(&self, port_id: i64) -> Result<Option<MeterPort>, StoreError> {
        Ok(self.ports.get(&port_id).cloned())
    }

    async fn home_meter_ports(
        &self,
        home_id: i64,
        kind: MeterKind,
    ) -> Result<Vec<MeterPort>, StoreError> {
        Ok(self
            .ports
            .values()
            .filter(|port| {
                port.meter
                    .as_ref()
                    .is_some_and(|meter| meter.kind == kind && meter.home_id == home_id)
            })
            .cloned()
            .collect())
    }

    async fn production_meter_ports(&self, home_id: i64) -> Result<Vec<MeterPort>, StoreError> {
        let submeter_ports = self.home_meter_ports(home_id, MeterKind::Sub).await?;
        Ok(submeter_ports
            .into_iter()
            .filter(|port| self.production_ports.contains(&port.id))
            .collect())
    }

    async fn port_has_samples(&self, port_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .samples
            .get(&port_id)
            .is_some_and(|samples| !samples.is_empty()))
    }

    async fn samples_for_port(
        &self,
        port_id: i64,
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError> {
        Ok(self.samples_in(port_id, range).collect())
    }

    async fn samples_for_ports(
        &self,
        port_ids: &[i64],
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError> {
        let mut merged: Vec<Sample> = port_ids
            .iter()
            .flat_map(|port_id| self.samples_in(*port_id, range))
            .collect();
        merged.sort_by_key(|sample| sample.timestamp);
        Ok(merged)
    }

    async fn samples_for_ports_grouped_by(
        &self,
        port_ids: &[i64],
        key: GroupKey,
        range: TimeRange,
    ) -> Result<Vec<SampleGroup>, StoreError> {
        let mut groups: BTreeMap<i64, Vec<Sample>> = BTreeMap::new();
        for port_id in port_ids {
            let Some(group) = self.group_key(*port_id, key) else {
                continue;
            };
            groups
                .entry(group)
                .or_default()
                .extend(self.samples_in(*port_id, range));
        }
        Ok(groups
            .into_iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(key, mut samples)| {
                samples.sort_by_key(|sample| sample.timestamp);
                SampleGroup { key, samples }
            })
            .collect())
    }

    async fn virtual_energy_ports(
        &self,
        virtual_port_id: i64,
    ) -> Result<Vec<VirtualEnergyPort>, StoreError> {
        Ok(self
            .virtual_ports
            .iter()
            .filter(|port| port.id == virtual_port_id)
            .copied()
            .collect())
    }

    async fn fixed_value_port(&self, port_id: i64) -> Result<Option<FixedValuePort>, StoreError> {
        Ok(self.fixed_value_ports.get(&port_id).copied())
    }

    async fn temperature_readings(
        &self,
        home_id: i64,
        range: TimeRange,
    ) -> Result<Vec<TemperatureReading>, StoreError> {
        let ports = self.home_meter_ports(home_id, MeterKind::Sub).await?;
        let mut readings: Vec<TemperatureReading> = ports
            .iter()
            .filter(|port| port.resource_type == TEMPERATURE_RESOURCE)
            .flat_map(|port| {
                let submeter_name = port
                    .meter
                    .as_ref()
                    .map(|meter| meter.name.clone())
                    .unwrap_or_default();
                self.samples_in(port.id, range)
                    .map(move |sample| TemperatureReading {
                        temperature: sample.value,
                        timestamp: sample.timestamp,
                        submeter_name: submeter_name.clone(),
                    })
            })
            .collect();
        readings.sort_by(|a, b| {
            a.submeter_name
                .cmp(&b.submeter_name)
                .then(a.timestamp.cmp(&b.timestamp))
        });
        Ok(readings)
    }
}
