use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::pagination::{paginate, Page};
use super::params::QueryParams;
use crate::engine::{
    Aggregate, AveragePower, CondensedValue, PowerFlow, StatusReport, TemperatureReading,
};
use crate::error::AppResult;
use crate::services::aggregated::aggregated_for_home;
use crate::services::status::status_for_home;
use crate::services::temperature::temperature_for_home;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AggregatedResponse {
    Paginated(Page<CondensedValue>),
    Totals(Vec<AveragePower>),
}

async fn aggregated(
    state: &AppState,
    home_id: i64,
    flow: PowerFlow,
    raw: Option<String>,
) -> AppResult<Json<AggregatedResponse>> {
    let params = QueryParams::parse(raw);
    let (from, to) = params.required_window()?;
    let resolution = params.resolution()?;
    let aggregate =
        aggregated_for_home(state.store.as_ref(), home_id, flow, from, to, resolution).await?;
    let response = match aggregate {
        Aggregate::Condensed(values) => {
            AggregatedResponse::Paginated(paginate(values, params.page(), state.config.page_size))
        }
        Aggregate::Total(total) => AggregatedResponse::Totals(vec![total]),
    };
    Ok(Json(response))
}

pub(crate) async fn energy_consumption(
    State(state): State<AppState>,
    Path(home_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<AggregatedResponse>> {
    aggregated(&state, home_id, PowerFlow::Consumption, raw).await
}

pub(crate) async fn energy_production(
    State(state): State<AppState>,
    Path(home_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<AggregatedResponse>> {
    aggregated(&state, home_id, PowerFlow::Production, raw).await
}

pub(crate) async fn status(
    State(state): State<AppState>,
    Path(home_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Vec<StatusReport>>> {
    let params = QueryParams::parse(raw);
    let (from, to) = params.required_window()?;
    let tolerance = params.tolerance()?;
    let reports = status_for_home(state.store.as_ref(), home_id, from, to, tolerance).await?;
    Ok(Json(reports))
}

pub(crate) async fn temperature(
    State(state): State<AppState>,
    Path(home_id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Page<TemperatureReading>>> {
    let params = QueryParams::parse(raw);
    let window = params.optional_window()?;
    let readings = temperature_for_home(state.store.as_ref(), home_id, window).await?;
    Ok(Json(paginate(readings, params.page(), state.config.page_size)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/homes/{home_id}/energy_consumption", get(energy_consumption))
        .route("/homes/{home_id}/energy_production", get(energy_production))
        .route("/homes/{home_id}/status", get(status))
        .route("/homes/{home_id}/temperature", get(temperature))
}
