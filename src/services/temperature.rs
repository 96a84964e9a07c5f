use chrono::{DateTime, Utc};

use super::ensure_ordered;
use crate::engine::TemperatureReading;
use crate::error::EngineError;
use crate::store::{MeasurementStore, TimeRange};

/// Temperature readings of a home's submeters, inside the closed `window`
/// when one is given.
pub async fn temperature_for_home(
    store: &dyn MeasurementStore,
    home_id: i64,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<TemperatureReading>, EngineError> {
    let range = match window {
        Some((from, to)) => {
            ensure_ordered(from, to)?;
            TimeRange::closed(from, to)
        }
        None => TimeRange::unbounded(),
    };
    let readings = store.temperature_readings(home_id, range).await?;
    tracing::debug!(home_id, readings = readings.len(), "listing home temperatures");
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Sample, Unit};
    use crate::store::{InMemoryStore, MeterPort, TEMPERATURE_RESOURCE};
    use crate::test_support::{minutes, sub_port};

    fn sensor(id: i64, submeter_id: i64) -> MeterPort {
        MeterPort {
            resource_type: TEMPERATURE_RESOURCE.to_string(),
            unit: Unit::Temperature,
            ..sub_port(id, submeter_id, 1)
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_port(sensor(1, 10))
            .with_port(sensor(2, 20))
            .with_samples(1, [Sample::new(minutes(0), 12_000), Sample::new(minutes(10), 10_000)])
            .with_samples(2, [Sample::new(minutes(0), 8_000), Sample::new(minutes(20), 1_000)])
    }

    #[tokio::test]
    async fn closed_window_keeps_its_edges() {
        let readings = temperature_for_home(&store(), 1, Some((minutes(0), minutes(10))))
            .await
            .expect("readings");
        let flat: Vec<_> = readings
            .iter()
            .map(|r| (r.submeter_name.as_str(), r.temperature))
            .collect();
        assert_eq!(
            flat,
            vec![("submeter 10", 12_000), ("submeter 10", 10_000), ("submeter 20", 8_000)]
        );
    }

    #[tokio::test]
    async fn without_window_lists_everything() {
        let readings = temperature_for_home(&store(), 1, None).await.expect("readings");
        assert_eq!(readings.len(), 4);
    }

    #[tokio::test]
    async fn reversed_window_is_rejected() {
        let err = temperature_for_home(&store(), 1, Some((minutes(10), minutes(0))))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimeSpan(_)));
    }
}
