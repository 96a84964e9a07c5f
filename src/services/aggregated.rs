use chrono::{DateTime, Utc};

use super::{ensure_ordered, padded_bounds};
use crate::engine::aggregate::{mainmeter_consumption, submeter_production};
use crate::engine::{Aggregate, MeterKind, PowerFlow, Resolution, Unit};
use crate::error::EngineError;
use crate::store::{GroupKey, MeasurementStore, MeterPort, TimeRange};

fn energy_port_ids(ports: &[MeterPort]) -> Vec<i64> {
    ports
        .iter()
        .filter(|port| port.unit == Unit::Energy)
        .map(|port| port.id)
        .collect()
}

/// Home-level consumption (main meters) or production (submeters) over
/// `[from, to]`, condensed when a resolution is given.
pub async fn aggregated_for_home(
    store: &dyn MeasurementStore,
    home_id: i64,
    flow: PowerFlow,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    resolution: Option<Resolution>,
) -> Result<Aggregate, EngineError> {
    ensure_ordered(from, to)?;

    let range = match resolution {
        Some(resolution) => {
            let (start, end) = padded_bounds(from, to, resolution)?;
            TimeRange::closed(start, end)
        }
        None => TimeRange::closed(from, to),
    };

    match flow {
        PowerFlow::Consumption => {
            let ports = store.home_meter_ports(home_id, MeterKind::Main).await?;
            let port_ids = energy_port_ids(&ports);
            let samples = store.samples_for_ports(&port_ids, range).await?;
            tracing::debug!(
                home_id,
                ports = port_ids.len(),
                samples = samples.len(),
                "aggregating mainmeter consumption"
            );
            Ok(mainmeter_consumption(&samples, from, to, resolution))
        }
        PowerFlow::Production => {
            let ports = store.production_meter_ports(home_id).await?;
            let port_ids = energy_port_ids(&ports);
            let groups = store
                .samples_for_ports_grouped_by(&port_ids, GroupKey::Submeter, range)
                .await?;
            tracing::debug!(
                home_id,
                ports = port_ids.len(),
                submeters = groups.len(),
                "aggregating submeter production"
            );
            Ok(submeter_production(&groups, from, to, resolution))
        }
    }
}
