use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{DailyAggregate, TrendPoint, TrendQuery};
use super::services::{DEFAULT_TREND_DAYS, MAX_TREND_DAYS};
use crate::context::today;
use crate::food_log::dto::DateQuery;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/totals", get(get_totals))
        .route("/users/:user_id/trend", get(get_trend))
}

/// GET /users/:user_id/totals?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn get_totals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<DateQuery>,
) -> Result<Json<DailyAggregate>, (StatusCode, String)> {
    let date = q.date.unwrap_or_else(today);
    let totals = state
        .aggregator
        .daily_totals(user_id, date)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(totals))
}

/// GET /users/:user_id/trend?end=YYYY-MM-DD&days=7
#[instrument(skip(state))]
pub async fn get_trend(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<TrendQuery>,
) -> Result<Json<Vec<TrendPoint>>, (StatusCode, String)> {
    let days = q.days.unwrap_or(DEFAULT_TREND_DAYS);
    if days > MAX_TREND_DAYS {
        warn!(days, "trend window too large");
        return Err((
            StatusCode::BAD_REQUEST,
            format!("days must be at most {MAX_TREND_DAYS}"),
        ));
    }
    let end = q.end.unwrap_or_else(today);
    let points = state
        .aggregator
        .trend(user_id, end, days)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(points))
}
