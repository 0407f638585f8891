use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::dto::{DateQuery, DayView, ManualFields, StoredEntry};
use super::services::{EntryInput, ImageUpload};
use crate::aggregate::DailyAggregate;
use crate::context::{today, RequestContext};
use crate::error::EntryError;
use crate::state::AppState;

/// Matches the upload cap of the web form.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/users/:user_id/entries", get(get_day))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/entries/image", post(create_image_entry))
        .route("/users/:user_id/entries/manual", post(create_manual_entry))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// POST /users/:user_id/entries/image (multipart, field `food_image`)
#[instrument(skip(state, mp))]
pub async fn create_image_entry(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<DateQuery>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<StoredEntry>), (StatusCode, String)> {
    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(bad_request)? {
        if field.name() != Some("food_image") {
            continue;
        }
        let mime_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(bad_request)?;
        if !body.is_empty() {
            upload = Some(ImageUpload { body, mime_type });
        }
    }
    let Some(upload) = upload else {
        return Err((StatusCode::BAD_REQUEST, "food_image is required".into()));
    };

    let ctx = RequestContext::new(user_id, q.date.unwrap_or_else(today));
    let stored = state
        .pipeline
        .submit(&ctx, EntryInput::Image(upload))
        .await
        .map_err(entry_error)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /users/:user_id/entries/manual
#[instrument(skip(state, body))]
pub async fn create_manual_entry(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<DateQuery>,
    Json(body): Json<ManualFields>,
) -> Result<(StatusCode, Json<StoredEntry>), (StatusCode, String)> {
    let ctx = RequestContext::new(user_id, q.date.unwrap_or_else(today));
    let stored = state
        .pipeline
        .submit(&ctx, EntryInput::Manual(body))
        .await
        .map_err(entry_error)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /users/:user_id/entries?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<DateQuery>,
) -> Result<Json<DayView>, (StatusCode, String)> {
    let date = q.date.unwrap_or_else(today);
    let entries = state.store.list(user_id, date).await.map_err(internal)?;
    let totals = DailyAggregate::from_entries(date, &entries);
    let goal = state.goals.get_goal(user_id).await.map_err(internal)?;
    Ok(Json(DayView {
        date,
        entries,
        totals,
        goal,
    }))
}

fn entry_error(e: EntryError) -> (StatusCode, String) {
    let status = e.status();
    if status.is_server_error() {
        error!(error = %e, "entry submission failed");
    } else {
        warn!(error = %e, "entry rejected");
    }
    (status, e.to_string())
}

fn bad_request<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
