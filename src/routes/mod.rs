pub mod fixed_value_ports;
pub mod health;
pub mod homes;
pub mod meter_ports;
pub mod pagination;
pub mod params;
pub mod virtual_energy_ports;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::panic_response;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest(
            "/api",
            Router::new()
                .merge(meter_ports::router())
                .merge(homes::router())
                .merge(virtual_energy_ports::router())
                .merge(fixed_value_ports::router()),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Sample;
    use crate::store::{
        FixedValuePort, InMemoryStore, MeterPort, VirtualEnergyPort, TEMPERATURE_RESOURCE,
    };
    use crate::test_support::{main_port, minutes, port, sub_port, test_state};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn sensor(id: i64, submeter_id: i64, home_id: i64) -> MeterPort {
        MeterPort {
            resource_type: TEMPERATURE_RESOURCE.to_string(),
            unit: crate::engine::Unit::Temperature,
            ..sub_port(id, submeter_id, home_id)
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            // home 2 producers start on different grid points
            .with_production_port(sub_port(4, 40, 2))
            .with_production_port(sub_port(5, 50, 2))
            .with_samples(4, [Sample::new(minutes(0), 0), Sample::new(minutes(60), 60)])
            .with_samples(5, [Sample::new(minutes(30), 0), Sample::new(minutes(60), 30)])
            .with_port(sensor(6, 60, 3))
            .with_port(sensor(7, 70, 3))
            .with_samples(6, [Sample::new(minutes(0), 21_000), Sample::new(minutes(10), 21_500)])
            .with_samples(7, [Sample::new(minutes(0), 4_000)])
            .with_port(main_port(1, 1))
            .with_production_port(sub_port(2, 20, 1))
            .with_port(crate::store::MeterPort {
                unit: crate::engine::Unit::Voltage,
                ..port(3)
            })
            .with_samples(
                1,
                (0..=120).map(|m| Sample::new(minutes(m), 1_000 + 10 * m)),
            )
            .with_samples(2, [Sample::new(minutes(0), 0), Sample::new(minutes(60), 600)])
            .with_samples(3, [Sample::new(minutes(0), 230_000), Sample::new(minutes(60), 231_000)])
            .with_virtual_port(VirtualEnergyPort {
                id: 50,
                consumption: 1,
                current: 2,
                voltage: 3,
                power_factor: 1,
            })
            .with_fixed_value_port(FixedValuePort {
                id: 60,
                value: 250,
                resolution_in_seconds: 3_600,
            })
    }

    async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
        let app = router(test_state(store()));
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(uri).await;
        let json = serde_json::from_slice(&body).expect("json body");
        (status, json)
    }

    #[tokio::test]
    async fn healthz_ok() {
        let (status, json) = get_json("/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn condensed_is_paginated() {
        let (status, json) = get_json(
            "/api/meter_ports/1/condensed?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T02:00:00Z&tau=1min&page=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 120);
        assert_eq!(json["num_pages"], 6);
        assert_eq!(json["page"], 2);
        let results = json["results"].as_array().expect("results");
        assert_eq!(results.len(), 20);
        assert_eq!(results[0]["value"], 10);
        assert_eq!(results[0]["from_timestamp"], "2024-01-01T00:20:00Z");
    }

    #[tokio::test]
    async fn hourly_alias_uses_fixed_resolution() {
        let (status, json) = get_json(
            "/api/meter_ports/1/hourly_condensed?from_timestamp=2024-01-01T00:00:00&to_timestamp=2024-01-01T02:00:00",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        assert_eq!(json["results"][1]["value"], 600);
    }

    #[tokio::test]
    async fn condensed_rejects_unknown_tau() {
        let (status, body) = get(
            "/api/meter_ports/1/condensed?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T02:00:00Z&tau=2h",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&body).contains("tau"));
    }

    #[tokio::test]
    async fn condensed_requires_window() {
        let (status, _) = get("/api/meter_ports/1/condensed?tau=1h").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn condensed_unknown_port_is_404() {
        let (status, _) = get(
            "/api/meter_ports/99/condensed?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T02:00:00Z&tau=1h",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn condensed_rejects_non_energy_port() {
        let (status, _) = get(
            "/api/meter_ports/3/condensed?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T01:00:00Z&tau=1h",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn consumption_total_without_tau() {
        let (status, json) = get_json(
            "/api/homes/1/energy_consumption?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T01:00:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["value"], 600);
        assert_eq!(json[0]["unit"], "milliwatt*hour");
    }

    #[tokio::test]
    async fn production_condensed_with_tau() {
        let (status, json) = get_json(
            "/api/homes/1/energy_production?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T01:00:00Z&tau=30min",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        assert_eq!(json["results"][0]["value"], 300);
    }

    #[tokio::test]
    async fn status_requires_valid_tolerance() {
        let (status, body) = get(
            "/api/homes/1/status?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T02:00:00Z&tolerance=2h",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&body).contains("30min"));
    }

    #[tokio::test]
    async fn status_reports_submeter_gap() {
        let (status, json) = get_json(
            "/api/homes/1/status?from_timestamp=2023-12-31T23:00:00Z&to_timestamp=2024-01-01T02:00:00Z&tolerance=30min",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reports = json.as_array().expect("reports");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["meter_type"], "submeters");
        assert_eq!(reports[0]["time_discrepancy_sec"], 3_600);
    }

    #[tokio::test]
    async fn virtual_port_measurements() {
        let (status, json) = get_json("/api/virtual_energy_ports/50/measurements").await;
        assert_eq!(status, StatusCode::OK);
        let measurements = json.as_array().expect("measurements");
        // current readings exist only at 0 and 60, so only the leader pairs touching them remain
        assert_eq!(measurements.len(), 3);
        assert_eq!(measurements[0]["from_timestamp"], "2024-01-01T00:00:00Z");

        let (status, _) = get("/api/virtual_energy_ports/51/measurements").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            get("/api/virtual_energy_ports/50/measurements?to_timestamp=2024-01-01T01:00:00Z").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn fixed_value_measurements() {
        let (status, json) = get_json(
            "/api/fixed_value_meter_ports/60/measurements?from_timestamp=2024-01-01T00:30:00Z&to_timestamp=2024-01-01T03:30:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let samples = json.as_array().expect("samples");
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0]["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(samples[0]["value"], 250);
    }

    #[tokio::test]
    async fn misaligned_producers_answer_500() {
        let (status, body) = get(
            "/api/homes/2/energy_production?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T01:00:00Z&tau=30min",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(String::from_utf8_lossy(&body), "Internal server error");
    }

    #[tokio::test]
    async fn meter_port_raw_measurements() {
        let (status, json) = get_json(
            "/api/meter_ports/1/measurements?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T00:03:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let measurements = json.as_array().expect("measurements");
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0]["meter_port"], 1);
        assert_eq!(measurements[0]["timestamp"], "2024-01-01T00:01:00Z");
        assert_eq!(measurements[0]["value"], 1_010);

        let (status, _) = get(
            "/api/meter_ports/99/measurements?from_timestamp=2024-01-01T00:00:00Z&to_timestamp=2024-01-01T00:03:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get("/api/meter_ports/1/measurements").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn virtual_port_raw_measurements() {
        let (status, json) = get_json(
            "/api/virtual_energy_ports/50/raw_measurements?from_timestamp=2023-12-31T23:59:00Z&to_timestamp=2024-01-01T00:01:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ports: Vec<_> = json
            .as_array()
            .expect("measurements")
            .iter()
            .map(|m| m["meter_port"].as_i64().expect("port id"))
            .collect();
        assert_eq!(ports, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn home_temperature_is_paginated() {
        let (status, json) = get_json("/api/homes/3/temperature").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 3);
        assert_eq!(json["results"][0]["submeter_name"], "submeter 60");
        assert_eq!(json["results"][0]["temperature"], 21_000);
        assert_eq!(json["results"][2]["submeter_name"], "submeter 70");

        let (status, json) = get_json(
            "/api/homes/3/temperature?from_timestamp=2024-01-01T00:05:00Z&to_timestamp=2024-01-01T00:10:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0]["temperature"], 21_500);

        let (status, _) =
            get("/api/homes/3/temperature?from_timestamp=2024-01-01T00:05:00Z").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
