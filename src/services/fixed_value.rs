use chrono::{DateTime, Utc};

use crate::engine::fixed_value::fixed_value_samples;
use crate::engine::Sample;
use crate::error::{EngineError, PortKind};
use crate::store::MeasurementStore;

pub async fn fixed_value_measurements(
    store: &dyn MeasurementStore,
    port_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Sample>, EngineError> {
    let port = store
        .fixed_value_port(port_id)
        .await?
        .ok_or(EngineError::PortNotFound {
            kind: PortKind::FixedValuePort,
            id: port_id,
        })?;
    fixed_value_samples(port.value, port.resolution_in_seconds, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FixedValuePort, InMemoryStore};
    use crate::test_support::minutes;

    #[tokio::test]
    async fn synthesizes_constant_series() {
        let store = InMemoryStore::new().with_fixed_value_port(FixedValuePort {
            id: 5,
            value: 1_200,
            resolution_in_seconds: 1_800,
        });
        let samples = fixed_value_measurements(&store, 5, minutes(0), minutes(120))
            .await
            .expect("samples");
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.value == 1_200));
        assert_eq!(samples[1].timestamp, minutes(30));
    }

    #[tokio::test]
    async fn unknown_port_is_not_found() {
        let err = fixed_value_measurements(&InMemoryStore::new(), 5, minutes(0), minutes(60))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::PortNotFound {
                kind: PortKind::FixedValuePort,
                id: 5
            }
        ));
    }
}
