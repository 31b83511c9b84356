//! Progress handlers. POST is an upsert keyed by date.

use super::{parse_body, JsonBody};
use crate::error::AppError;
use crate::model::NewProgressEntry;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::schema::PROGRESS_UPSERT;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

/// GET /api/progress
pub async fn list_progress(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.storage.list_progress_entries().await?;
    Ok(success_many(entries))
}

/// GET /api/progress/:date
pub async fn get_progress(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .storage
        .get_progress_entry(&date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no progress entry for {}", date)))?;
    Ok(success_one_ok(entry))
}

/// POST /api/progress — 201 whether the entry was created or updated in place.
pub async fn upsert_progress(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input: NewProgressEntry = parse_body(body, PROGRESS_UPSERT)?;
    let entry = state.storage.upsert_progress_entry(input).await?;
    tracing::info!(id = %entry.id, date = %entry.date, goals_completed = entry.goals_completed, "progress recorded");
    Ok(success_one(entry))
}
