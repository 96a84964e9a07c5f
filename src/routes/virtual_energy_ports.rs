use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};

use super::params::QueryParams;
use crate::engine::{Measurement, VirtualEnergyMeasurement};
use crate::error::AppResult;
use crate::services::measurements::measurements_for_virtual_port;
use crate::services::virtual_energy::virtual_energy_for_port;
use crate::state::AppState;

pub(crate) async fn measurements(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Vec<VirtualEnergyMeasurement>>> {
    let window = QueryParams::parse(raw).optional_window()?;
    let measurements = virtual_energy_for_port(state.store.as_ref(), port_id, window).await?;
    Ok(Json(measurements))
}

pub(crate) async fn raw_measurements(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Vec<Measurement>>> {
    let (from, to) = QueryParams::parse(raw).required_window()?;
    let measurements =
        measurements_for_virtual_port(state.store.as_ref(), port_id, from, to).await?;
    Ok(Json(measurements))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/virtual_energy_ports/{port_id}/measurements", get(measurements))
        .route("/virtual_energy_ports/{port_id}/raw_measurements", get(raw_measurements))
}
