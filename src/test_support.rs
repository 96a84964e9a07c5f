use crate::config::{ServiceConfig, DEFAULT_PAGE_SIZE};
use crate::engine::{MeterKind, Unit};
use crate::state::AppState;
use crate::store::{InMemoryStore, MeterPort, MeterRef};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Arc;

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        database_url: "postgresql://postgres@localhost/postgres".to_string(),
        db_pool_size: 1,
        http_host: "127.0.0.1".to_string(),
        http_port: 8000,
        page_size: DEFAULT_PAGE_SIZE,
    }
}

pub fn test_state(store: InMemoryStore) -> AppState {
    AppState::new(test_config(), Arc::new(store))
}

/// 2024-01-01T00:00:00Z plus `m` minutes.
pub fn minutes(m: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date")
        + TimeDelta::minutes(m)
}

/// Energy port not wired to any meter.
pub fn port(id: i64) -> MeterPort {
    MeterPort {
        id,
        name: format!("port {id}"),
        resource_type: "electricity".to_string(),
        unit: Unit::Energy,
        meter: None,
    }
}

pub fn main_port(id: i64, home_id: i64) -> MeterPort {
    MeterPort {
        meter: Some(MeterRef {
            kind: MeterKind::Main,
            id,
            name: format!("mainmeter {id}"),
            home_id,
        }),
        ..port(id)
    }
}

pub fn sub_port(id: i64, submeter_id: i64, home_id: i64) -> MeterPort {
    MeterPort {
        meter: Some(MeterRef {
            kind: MeterKind::Sub,
            id: submeter_id,
            name: format!("submeter {submeter_id}"),
            home_id,
        }),
        ..port(id)
    }
}
