use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};

use super::params::QueryParams;
use crate::engine::Sample;
use crate::error::AppResult;
use crate::services::fixed_value::fixed_value_measurements;
use crate::state::AppState;

pub(crate) async fn measurements(
    State(state): State<AppState>,
    Path(port_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Vec<Sample>>> {
    let (from, to) = QueryParams::parse(raw).required_window()?;
    let samples = fixed_value_measurements(state.store.as_ref(), port_id, from, to).await?;
    Ok(Json(samples))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/fixed_value_meter_ports/{port_id}/measurements", get(measurements))
}
