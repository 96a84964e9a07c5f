use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};

use super::pagination::{paginate, Page};
use super::params::QueryParams;
use crate::engine::{CondensedValue, Measurement, Resolution};
use crate::error::AppResult;
use crate::services::condensed::condensed_for_port;
use crate::services::measurements::measurements_for_port;
use crate::state::AppState;

async fn respond(
    state: &AppState,
    port_id: i64,
    params: &QueryParams,
    resolution: Resolution,
) -> AppResult<Json<Page<CondensedValue>>> {
    let (from, to) = params.required_window()?;
    let values = condensed_for_port(state.store.as_ref(), port_id, from, to, resolution).await?;
    Ok(Json(paginate(values, params.page(), state.config.page_size)))
}

pub(crate) async fn condensed(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Page<CondensedValue>>> {
    let params = QueryParams::parse(raw);
    let resolution = params.required_resolution()?;
    respond(&state, port_id, &params, resolution).await
}

pub(crate) async fn hourly_condensed(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Page<CondensedValue>>> {
    respond(&state, port_id, &QueryParams::parse(raw), Resolution::HOURLY).await
}

pub(crate) async fn daily_condensed(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Page<CondensedValue>>> {
    respond(&state, port_id, &QueryParams::parse(raw), Resolution::DAILY).await
}

pub(crate) async fn monthly_condensed(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Page<CondensedValue>>> {
    respond(&state, port_id, &QueryParams::parse(raw), Resolution::MONTHLY).await
}

pub(crate) async fn yearly_condensed(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Page<CondensedValue>>> {
    respond(&state, port_id, &QueryParams::parse(raw), Resolution::YEARLY).await
}

pub(crate) async fn measurements(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Vec<Measurement>>> {
    let (from, to) = QueryParams::parse(raw).required_window()?;
    let measurements = measurements_for_port(state.store.as_ref(), port_id, from, to).await?;
    Ok(Json(measurements))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meter_ports/{port_id}/measurements", get(measurements))
        .route("/meter_ports/{port_id}/condensed", get(condensed))
        .route("/meter_ports/{port_id}/hourly_condensed", get(hourly_condensed))
        .route("/meter_ports/{port_id}/daily_condensed", get(daily_condensed))
        .route("/meter_ports/{port_id}/monthly_condensed", get(monthly_condensed))
        .route("/meter_ports/{port_id}/yearly_condensed", get(yearly_condensed))
}
