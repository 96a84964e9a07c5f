use chrono::{DateTime, Utc};

use super::ensure_ordered;
use super::virtual_energy::resolve_virtual_port;
use crate::engine::Measurement;
use crate::error::{EngineError, PortKind};
use crate::store::{GroupKey, MeasurementStore, TimeRange};

async fn measurements_for_ports(
    store: &dyn MeasurementStore,
    mut port_ids: Vec<i64>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Measurement>, EngineError> {
    ensure_ordered(from, to)?;
    port_ids.sort_unstable();
    port_ids.dedup();

    let groups = store
        .samples_for_ports_grouped_by(&port_ids, GroupKey::MeterPort, TimeRange::open(from, to))
        .await?;
    let mut measurements: Vec<Measurement> = groups
        .into_iter()
        .flat_map(|group| {
            group.samples.into_iter().map(move |sample| Measurement {
                meter_port: group.key,
                timestamp: sample.timestamp,
                value: sample.value,
            })
        })
        .collect();
    // stable, so equal timestamps stay in port order
    measurements.sort_by_key(|measurement| measurement.timestamp);
    tracing::debug!(
        ports = port_ids.len(),
        measurements = measurements.len(),
        "listing raw measurements"
    );
    Ok(measurements)
}

/// Stored readings of one meter port strictly inside `(from, to)`.
pub async fn measurements_for_port(
    store: &dyn MeasurementStore,
    port_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Measurement>, EngineError> {
    if store.meter_port(port_id).await?.is_none() {
        return Err(EngineError::PortNotFound {
            kind: PortKind::MeterPort,
            id: port_id,
        });
    }
    measurements_for_ports(store, vec![port_id], from, to).await
}

/// Stored readings of every port a virtual energy port combines, merged in
/// timestamp order.
pub async fn measurements_for_virtual_port(
    store: &dyn MeasurementStore,
    virtual_port_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Measurement>, EngineError> {
    let port = resolve_virtual_port(store, virtual_port_id).await?;
    let port_ids = vec![
        port.consumption,
        port.current,
        port.voltage,
        port.power_factor,
    ];
    measurements_for_ports(store, port_ids, from, to).await
}
