use chrono::{DateTime, Utc};

use crate::engine::virtual_port::{virtual_energy_measurements, FollowerStreams};
use crate::engine::VirtualEnergyMeasurement;
use crate::error::{EngineError, PortKind};
use crate::store::{MeasurementStore, TimeRange, VirtualEnergyPort};

/// The single virtual port registered under `virtual_port_id`.
pub(crate) async fn resolve_virtual_port(
    store: &dyn MeasurementStore,
    virtual_port_id: i64,
) -> Result<VirtualEnergyPort, EngineError> {
    let mut matches = store.virtual_energy_ports(virtual_port_id).await?;
    match matches.len() {
        0 => Err(EngineError::PortNotFound {
            kind: PortKind::VirtualEnergyPort,
            id: virtual_port_id,
        }),
        1 => Ok(matches.remove(0)),
        count => {
            tracing::warn!(virtual_port_id, count, "virtual port has multiple entries");
            Err(EngineError::AmbiguousVirtualPort(virtual_port_id))
        }
    }
}

/// Combined measurements of a virtual energy port, optionally restricted to
/// samples strictly inside `window`.
pub async fn virtual_energy_for_port(
    store: &dyn MeasurementStore,
    virtual_port_id: i64,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<VirtualEnergyMeasurement>, EngineError> {
    let port = resolve_virtual_port(store, virtual_port_id).await?;

    let range = match window {
        Some((from, to)) => TimeRange::open(from, to),
        None => TimeRange::unbounded(),
    };

    let (leader, current, voltage, power_factor) = tokio::try_join!(
        store.samples_for_port(port.consumption, range),
        store.samples_for_port(port.current, range),
        store.samples_for_port(port.voltage, range),
        store.samples_for_port(port.power_factor, range),
    )?;
    tracing::debug!(
        virtual_port_id,
        leader = leader.len(),
        "aligning virtual energy port"
    );

    let followers = FollowerStreams {
        current: &current,
        voltage: &voltage,
        power_factor: &power_factor,
    };
    Ok(virtual_energy_measurements(&leader, followers).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Sample;
    use crate::store::{InMemoryStore, VirtualEnergyPort};
    use crate::test_support::minutes;

    fn virtual_port(id: i64) -> VirtualEnergyPort {
        VirtualEnergyPort {
            id,
            consumption: 1,
            current: 2,
            voltage: 3,
            power_factor: 4,
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_virtual_port(virtual_port(100))
            .with_samples(
                1,
                [
                    Sample::new(minutes(0), 0),
                    Sample::new(minutes(10), 10),
                    Sample::new(minutes(20), 25),
                ],
            )
            .with_samples(2, [Sample::new(minutes(5), 4), Sample::new(minutes(15), 6)])
            .with_samples(3, [Sample::new(minutes(5), 230), Sample::new(minutes(15), 232)])
            .with_samples(4, [Sample::new(minutes(5), 900), Sample::new(minutes(15), 1_000)])
    }

    #[tokio::test]
    async fn joins_leader_with_followers() {
        let measurements = virtual_energy_for_port(&store(), 100, None)
            .await
            .expect("measurements");
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].current, 4);
        assert_eq!(measurements[1].voltage, 232);
        assert_eq!(measurements[1].consumption_acc_stop, 25);
    }

    #[tokio::test]
    async fn window_excludes_its_endpoints() {
        let measurements = virtual_energy_for_port(&store(), 100, Some((minutes(0), minutes(20))))
            .await
            .expect("measurements");
        // only the leader sample at 10 remains, so there is no pair
        assert!(measurements.is_empty());
    }

    #[tokio::test]
    async fn unknown_port_is_not_found() {
        let err = virtual_energy_for_port(&store(), 7, None).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::PortNotFound {
                kind: PortKind::VirtualEnergyPort,
                id: 7
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_entries_are_ambiguous() {
        let store = store().with_virtual_port(virtual_port(100));
        let err = virtual_energy_for_port(&store, 100, None).await.unwrap_err();
        assert!(matches!(err, EngineError::AmbiguousVirtualPort(100)));
    }
}
