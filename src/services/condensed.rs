use chrono::{DateTime, Utc};

use super::padded_bounds;
use crate::engine::condense::{condense_with_recovery, ensure_energy_unit};
use crate::engine::{CondensedValue, Resolution};
use crate::error::{EngineError, PortKind};
use crate::store::{MeasurementStore, TimeRange};

/// Interval deltas of one energy meter port over `[from, to]`.
pub async fn condensed_for_port(
    store: &dyn MeasurementStore,
    port_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    resolution: Resolution,
) -> Result<Vec<CondensedValue>, EngineError> {
    if from == to {
        tracing::warn!(port_id, %from, "rejected empty condensation window");
        return Err(EngineError::invalid_time_span(
            "Cannot interpolate over equal timestamps",
        ));
    }
    if to < from {
        tracing::warn!(port_id, %from, %to, "rejected reversed condensation window");
        return Err(EngineError::invalid_time_span(
            "from_timestamp must be earlier than to_timestamp",
        ));
    }

    let (start, end) = padded_bounds(from, to, resolution)?;
    let samples = store
        .samples_for_port(port_id, TimeRange::open(start, end))
        .await?;
    tracing::debug!(port_id, samples = samples.len(), ?resolution, "condensing meter port");

    if samples.is_empty() {
        if !store.port_has_samples(port_id).await? {
            return Err(EngineError::PortNotFound {
                kind: PortKind::MeterPort,
                id: port_id,
            });
        }
        return Err(EngineError::NoDataInWindow { port_id });
    }

    let port = store
        .meter_port(port_id)
        .await?
        .ok_or(EngineError::PortNotFound {
            kind: PortKind::MeterPort,
            id: port_id,
        })?;
    ensure_energy_unit(port_id, port.unit)?;

    condense_with_recovery(&samples, from, resolution)
}
