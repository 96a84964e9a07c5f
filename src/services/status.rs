use chrono::{DateTime, Utc};

use super::ensure_ordered;
use crate::engine::discrepancy::detect_time_gaps;
use crate::engine::{MeterKind, StatusReport, Tolerance};
use crate::error::EngineError;
use crate::store::{MeasurementStore, TimeRange};

/// Reports every gap longer than `tolerance` between consecutive readings of
/// each main meter port, then each submeter port, of a home.
pub async fn status_for_home(
    store: &dyn MeasurementStore,
    home_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tolerance: Tolerance,
) -> Result<Vec<StatusReport>, EngineError> {
    ensure_ordered(from, to)?;
    let range = TimeRange::open(from, to);
    let mut reports = Vec::new();

    for kind in [MeterKind::Main, MeterKind::Sub] {
        for port in store.home_meter_ports(home_id, kind).await? {
            let samples = store.samples_for_port(port.id, range).await?;
            let timestamps: Vec<DateTime<Utc>> =
                samples.iter().map(|sample| sample.timestamp).collect();
            let meter_name = port
                .meter
                .as_ref()
                .map(|meter| meter.name.clone())
                .unwrap_or_default();

            for gap in detect_time_gaps(&timestamps, tolerance) {
                reports.push(StatusReport {
                    meter_type: kind,
                    meter_name: meter_name.clone(),
                    resource_type: port.resource_type.clone(),
                    meterport_name: port.name.clone(),
                    time_discrepancy_occurrence: gap.occurred_at,
                    time_discrepancy_sec: gap.whole_seconds(),
                });
            }
        }
    }

    tracing::debug!(home_id, reports = reports.len(), "checked meter port status");
    Ok(reports)
}
